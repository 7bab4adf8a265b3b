// Web UIs
// - app: single page that calls POST /api/detect from the browser
// - studio: server-rendered form that runs detection on submit

use axum::{
    extract::State,
    response::Html,
    Form,
};
use serde::Deserialize;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::api::AppState;
use crate::models::{Bucket, Verdict};
use crate::services::DetectError;

const PAGE_TITLE: &str = "AI Detector";
const TAGLINE: &str = "Maintain the authenticity of your writing by identifying AI-generated content.";

const SAMPLE_TEXT: &str = "Deep learning models have demonstrated remarkable capabilities in natural language processing tasks. However, distinguishing between human-written and machine-generated text remains a significant challenge in the current digital landscape.";

const BASE_CSS: &str = r#"
body { background: #F8F9FA; color: #1A202C; font-family: 'Helvetica Neue', sans-serif; margin: 0; }
main { max-width: 860px; margin: 0 auto; padding: 3rem 1rem; }
header { text-align: center; margin-bottom: 2rem; }
header h1 { font-size: 2.6rem; font-weight: 800; margin-bottom: .5rem; }
header p { color: #718096; font-size: 1.1rem; }
textarea { width: 100%; min-height: 280px; box-sizing: border-box; padding: 1.5rem; font-size: 1.05rem;
  border: 1px solid #E2E8F0; border-radius: 16px; background: #FFFFFF; color: #2D3748; resize: vertical; }
.actions { display: flex; gap: 1rem; justify-content: flex-end; align-items: center; margin-top: 1rem; }
button { background: #2D3748; color: white; border: none; border-radius: 30px; padding: .6rem 2rem; font-weight: 600; cursor: pointer; }
button.secondary { background: #FFFFFF; color: #4A5568; border: 1px solid #E2E8F0; }
button:disabled { background: #CBD5E0; cursor: not-allowed; }
.chars { color: #A0AEC0; font-size: .9rem; }
.result-box { padding: 24px; border-radius: 16px; margin-top: 30px; display: flex; gap: 15px; align-items: center; }
.human-safe { background: #F0FFF4; border: 1px solid #C6F6D5; color: #276749; }
.ai-warning { background: #FFF5F5; border: 1px solid #FED7D7; color: #9B2C2C; }
.uncertain { background: #FFFFF0; border: 1px solid #FEEBC8; color: #975A16; }
.notice { margin-top: 20px; padding: 14px 20px; border-radius: 12px; background: #FFFAF0; border: 1px solid #FBD38D; color: #744210; }
.error { margin-top: 20px; padding: 14px 20px; border-radius: 12px; background: #FFF5F5; border: 1px solid #FEB2B2; color: #9B2C2C; }
.headline { font-size: 1.4rem; font-weight: 800; }
.detail { font-size: .9rem; opacity: .8; }
progress { width: 100%; height: 14px; margin-top: 16px; }
.caption { color: #A0AEC0; font-size: .85rem; margin-top: .5rem; }
footer { margin-top: 50px; text-align: center; color: #CBD5E0; font-size: .8em; }
"#;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
<main>
<header><h1>{title}</h1><p>{tagline}</p></header>
{body}
<footer>Powered by a pre-trained text-classification model</footer>
</main>
</body>
</html>"#,
        title = PAGE_TITLE,
        css = BASE_CSS,
        tagline = TAGLINE,
        body = body,
    )
}

// ============ App UI ============

/// `GET /`
pub async fn app_page() -> Html<String> {
    Html(layout(&app_body()))
}

fn app_body() -> String {
    let script = r#"
const input = document.getElementById('text');
const check = document.getElementById('check');
const clear = document.getElementById('clear');
const chars = document.getElementById('chars');
const result = document.getElementById('result');

function refresh() {
  chars.textContent = input.value.length + ' chars';
  check.disabled = input.value.trim().length === 0;
  clear.hidden = input.value.length === 0;
}
function reset() { result.className = ''; result.textContent = ''; }

input.addEventListener('input', () => { reset(); refresh(); });
clear.addEventListener('click', () => { input.value = ''; reset(); refresh(); });
document.getElementById('sample').addEventListener('click', () => {
  input.value = document.getElementById('sample').dataset.text; reset(); refresh();
});
document.getElementById('paste').addEventListener('click', async () => {
  try { input.value = await navigator.clipboard.readText(); reset(); refresh(); }
  catch (e) { alert('Unable to read the clipboard, please paste manually.'); }
});
check.addEventListener('click', async () => {
  if (!input.value.trim()) return;
  check.disabled = true;
  check.textContent = 'Checking...';
  reset();
  try {
    const resp = await fetch('/api/detect', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ text: input.value }),
    });
    const data = await resp.json();
    if (!resp.ok) {
      result.className = 'notice';
      result.textContent = data.detail || 'Request rejected';
    } else {
      result.className = 'result-box ' + (data.is_ai ? 'ai-warning' : 'human-safe');
      result.textContent = data.message + ' (' + data.score + '%)';
    }
  } catch (e) {
    result.className = 'error';
    result.textContent = 'Unable to reach the server.';
  } finally {
    check.textContent = 'Check for AI Content';
    refresh();
  }
});
refresh();
"#;

    format!(
        r#"<textarea id="text" placeholder="Enter text here to check for AI content."></textarea>
<div class="actions">
  <button class="secondary" id="paste" type="button">Paste Text</button>
  <button class="secondary" id="sample" type="button" data-text="{sample}">Sample Text</button>
  <button class="secondary" id="clear" type="button" hidden>Clear</button>
  <span class="chars" id="chars">0 chars</span>
  <button id="check" type="button" disabled>Check for AI Content</button>
</div>
<div id="result"></div>
<script>{script}</script>"#,
        sample = escape_html(SAMPLE_TEXT),
        script = script,
    )
}

// ============ Studio UI ============

#[derive(Debug, Default, Deserialize)]
pub struct StudioForm {
    #[serde(default)]
    pub text: String,
}

/// What the studio renders under the form.
#[derive(Debug, Clone, PartialEq)]
pub enum StudioOutcome {
    Blank,
    Rejected(String),
    Verdict { verdict: Verdict, chars: usize },
    Failed(String),
    ModelUnavailable(String),
}

/// `GET /studio`
pub async fn studio_page(State(state): State<AppState>) -> Html<String> {
    Html(render_studio("", &StudioOutcome::Blank, &state.model))
}

/// `POST /studio`
pub async fn studio_submit(
    State(state): State<AppState>,
    Form(form): Form<StudioForm>,
) -> Html<String> {
    let span = info_span!("studio.detect", request_id = %Uuid::new_v4());
    let outcome = run_studio(&state, &form.text).instrument(span).await;
    Html(render_studio(&form.text, &outcome, &state.model))
}

async fn run_studio(state: &AppState, text: &str) -> StudioOutcome {
    if let Err(err) = state.policy.admit(text) {
        return StudioOutcome::Rejected(err.to_string());
    }

    let Some(detector) = state.detector.as_ref() else {
        let reason = state
            .load_error
            .clone()
            .unwrap_or_else(|| "model not loaded".to_string());
        return StudioOutcome::ModelUnavailable(reason);
    };

    match detector.detect(text).await {
        Ok(verdict) => StudioOutcome::Verdict {
            verdict,
            chars: text.chars().count(),
        },
        Err(err) if err.is_input_error() => StudioOutcome::Rejected(err.to_string()),
        Err(err) => {
            warn!(error = %err, "studio.detect_failed");
            let reason = match err {
                DetectError::InferenceFailure(msg) | DetectError::InvalidModelOutput(msg) => msg,
                other => other.to_string(),
            };
            StudioOutcome::Failed(reason)
        }
    }
}

fn bucket_class(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::AiDetected => "ai-warning",
        Bucket::Uncertain => "uncertain",
        Bucket::LikelyHuman => "human-safe",
    }
}

fn score_line(verdict: &Verdict) -> String {
    let percent = format!("{:.1}", verdict.ai_probability_percent);
    match verdict.bucket {
        Bucket::AiDetected => format!("Confidence: <strong>{}%</strong>", percent),
        Bucket::LikelyHuman => format!("AI Probability: <strong>{}%</strong> (Very Low)", percent),
        Bucket::Uncertain => format!("AI Probability: <strong>{}%</strong>", percent),
    }
}

fn render_outcome(outcome: &StudioOutcome, model: &str) -> String {
    match outcome {
        StudioOutcome::Blank => String::new(),
        StudioOutcome::Rejected(reason) => {
            format!(r#"<div class="notice">{}</div>"#, escape_html(reason))
        }
        StudioOutcome::ModelUnavailable(reason) => format!(
            r#"<div class="error">The detection model is not available: {}</div>"#,
            escape_html(reason)
        ),
        StudioOutcome::Failed(reason) => format!(
            r#"<div class="error">Analysis Failed: {}</div>"#,
            escape_html(reason)
        ),
        StudioOutcome::Verdict { verdict, chars } => format!(
            r#"<div class="result-box {class}">
  <div>
    <div class="headline">{headline}</div>
    <div>{score}</div>
    <div class="detail">{detail}</div>
  </div>
</div>
<progress value="{value:.1}" max="100"></progress>
<div class="caption">Analysis based on {model} | Analyzed {chars} characters</div>"#,
            class = bucket_class(verdict.bucket),
            headline = verdict.bucket.headline(),
            score = score_line(verdict),
            detail = verdict.bucket.description(),
            value = verdict.ai_probability_percent,
            model = escape_html(model),
            chars = chars,
        ),
    }
}

pub fn render_studio(text: &str, outcome: &StudioOutcome, model: &str) -> String {
    let body = format!(
        r#"<form method="post" action="/studio">
<textarea name="text" placeholder="Paste your text here to check if it's AI-generated...">{text}</textarea>
<div class="actions">
  <a href="/studio"><button class="secondary" type="button">Clear</button></a>
  <button type="submit">Check Content</button>
</div>
</form>
{outcome}"#,
        text = escape_html(text),
        outcome = render_outcome(outcome, model),
    );
    layout(&body)
}
