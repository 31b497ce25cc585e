//! Upload page.
//!
//! A single embedded page exposing the upload region (drag/drop/click/paste)
//! and the extract action. Layout and theming are deliberately minimal; the
//! page only drives the JSON API.

use axum::{response::Html, routing::get, Router};

use crate::server::AppState;

/// Returns a router that serves the upload page at `/`.
pub fn ui_router() -> Router<AppState> {
    Router::new().route("/", get(|| async { Html(UPLOAD_PAGE) }))
}

const UPLOAD_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>PostLens</title>
<style>
  body { font-family: sans-serif; max-width: 640px; margin: 3rem auto; }
  #drop { border: 2px dashed #999; border-radius: 8px; padding: 3rem; text-align: center; cursor: pointer; }
  #drop.active { border-color: #46f; background: #eef; }
  #error { color: #b00; min-height: 1.2em; }
  #gallery { display: grid; grid-template-columns: repeat(3, 1fr); gap: 8px; margin-top: 1rem; }
  #gallery figure { position: relative; margin: 0; }
  #gallery img { width: 100%; aspect-ratio: 1; object-fit: cover; border-radius: 6px; }
  #gallery button { position: absolute; top: 4px; right: 4px; }
  #extract { margin-top: 1rem; padding: 0.5rem 1.5rem; }
</style>
</head>
<body>
<h1>Upload Your Image</h1>
<p>Drag and drop, paste, or click to select a file. Max file size 10MB.</p>
<div id="drop">Drop your image here or click to browse</div>
<input id="picker" type="file" multiple accept="image/jpeg,image/png,image/gif,image/webp" hidden>
<p id="error"></p>
<p id="status"></p>
<div id="gallery"></div>
<button id="extract">Extract Now</button>
<pre id="results"></pre>
<script>
const drop = document.getElementById('drop');
const picker = document.getElementById('picker');
const errorLine = document.getElementById('error');
const statusLine = document.getElementById('status');

async function refresh() {
  const images = await (await fetch('/api/images')).json();
  const gallery = document.getElementById('gallery');
  gallery.innerHTML = '';
  images.forEach((img, index) => {
    const fig = document.createElement('figure');
    const el = document.createElement('img');
    el.src = img.previewUrl;
    const rm = document.createElement('button');
    rm.textContent = 'x';
    rm.onclick = async () => {
      await fetch('/api/images/' + index, { method: 'DELETE' });
      refresh();
    };
    fig.append(el, rm);
    gallery.append(fig);
  });
}

async function send(files) {
  if (!files.length) return;
  const form = new FormData();
  for (const f of files) form.append('files', f, f.name);
  statusLine.textContent = 'Uploading...';
  try {
    const outcome = await (await fetch('/api/images', { method: 'POST', body: form })).json();
    errorLine.textContent = outcome.error || '';
  } finally {
    statusLine.textContent = '';
    refresh();
  }
}

drop.addEventListener('dragenter', e => { e.preventDefault(); drop.classList.add('active'); });
drop.addEventListener('dragover', e => e.preventDefault());
drop.addEventListener('dragleave', e => { e.preventDefault(); drop.classList.remove('active'); });
drop.addEventListener('drop', e => {
  e.preventDefault();
  drop.classList.remove('active');
  send([...e.dataTransfer.files]);
});
drop.addEventListener('click', () => picker.click());
picker.addEventListener('change', () => send([...picker.files]));
window.addEventListener('paste', e => {
  const files = [...(e.clipboardData?.items || [])]
    .filter(item => item.type.startsWith('image'))
    .map(item => item.getAsFile())
    .filter(Boolean);
  send(files);
});

document.getElementById('extract').addEventListener('click', async () => {
  statusLine.textContent = 'Extracting...';
  try {
    const results = await (await fetch('/api/extract', { method: 'POST' })).json();
    document.getElementById('results').textContent = JSON.stringify(results, null, 2);
  } finally {
    statusLine.textContent = '';
    refresh();
  }
});

refresh();
</script>
</body>
</html>
"#;
