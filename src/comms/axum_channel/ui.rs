//! The chat widget page served at `/`.
//!
//! Self-contained: inline CSS and JS, talking only to `/api/*`.

use axum::response::{Html, IntoResponse};

const WIDGET_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>WCC Info Bot</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #faf7fb; color: #222;
      display: flex; height: 100vh;
    }
    aside {
      width: 260px; padding: 1.5rem 1rem;
      background: #fff; border-right: 1px solid #e6dcea;
    }
    aside h2 { font-size: 1rem; margin-bottom: 1rem; }
    aside label { display: block; font-size: 0.85rem; margin-top: 1rem; }
    aside input[type=range] { width: 100%; }
    aside button { margin-top: 1.5rem; width: 100%; padding: 0.5rem; }
    main { flex: 1; display: flex; flex-direction: column; }
    header { padding: 1rem 1.5rem; border-bottom: 1px solid #e6dcea; }
    header h1 { font-size: 1.25rem; }
    header p  { font-size: 0.85rem; color: #777; }
    #log { flex: 1; overflow-y: auto; padding: 1rem 1.5rem; }
    .msg { max-width: 70%; margin: 0.5rem 0; padding: 0.6rem 0.9rem; border-radius: 10px; white-space: pre-wrap; }
    .user { background: #7b2d8b; color: #fff; margin-left: auto; }
    .assistant { background: #fff; border: 1px solid #e6dcea; }
    .note { font-size: 0.75rem; color: #999; margin: -0.25rem 0 0.5rem; }
    form { display: flex; gap: 0.5rem; padding: 1rem 1.5rem; border-top: 1px solid #e6dcea; }
    form input { flex: 1; padding: 0.6rem; border: 1px solid #ccc; border-radius: 6px; }
    form button { padding: 0.6rem 1.2rem; }
  </style>
</head>
<body>
  <aside>
    <h2>⚙️ Settings</h2>
    <label>Temperature <span id="temperature-v"></span>
      <input id="temperature" type="range" /></label>
    <label>Max Tokens <span id="max_tokens-v"></span>
      <input id="max_tokens" type="range" /></label>
    <label>Top-p <span id="top_p-v"></span>
      <input id="top_p" type="range" /></label>
    <button id="clear" type="button">Clear chat</button>
  </aside>
  <main>
    <header>
      <h1>🤖 WCC Info Bot</h1>
      <p>Ask me anything about the Women Coding Community</p>
    </header>
    <div id="log"></div>
    <form id="chat">
      <input id="text" autocomplete="off" placeholder="Ask about WCC..." />
      <button type="submit">Send</button>
    </form>
  </main>
  <script>
    const SLIDERS = ["temperature", "max_tokens", "top_p"];
    let sessionId = null;
    const log = document.getElementById("log");

    function add(role, text, note) {
      const div = document.createElement("div");
      div.className = "msg " + role;
      div.textContent = text;
      log.appendChild(div);
      if (note) {
        const n = document.createElement("div");
        n.className = "note";
        n.textContent = note;
        log.appendChild(n);
      }
      log.scrollTop = log.scrollHeight;
    }

    async function loadSettings() {
      const s = await (await fetch("/api/settings")).json();
      for (const key of SLIDERS) {
        const el = document.getElementById(key);
        Object.assign(el, { min: s[key].min, max: s[key].max, step: s[key].step, value: s[key].default });
        const show = () => document.getElementById(key + "-v").textContent = el.value;
        el.oninput = show; show();
      }
    }

    async function loadSession() {
      if (!sessionId) return;
      const res = await fetch("/api/session/" + sessionId);
      if (!res.ok) { sessionId = null; log.replaceChildren(); return; }
      const body = await res.json();
      log.replaceChildren();
      for (const m of body.messages) add(m.role, m.content);
    }

    async function send(text) {
      const body = { message: text, session_id: sessionId };
      body.temperature = parseFloat(document.getElementById("temperature").value);
      body.max_tokens = parseInt(document.getElementById("max_tokens").value, 10);
      body.top_p = parseFloat(document.getElementById("top_p").value);
      let res = await fetch("/api/message", {
        method: "POST", headers: { "content-type": "application/json" }, body: JSON.stringify(body),
      });
      if (res.status === 404) {
        sessionId = null;
        body.session_id = null;
        res = await fetch("/api/message", {
          method: "POST", headers: { "content-type": "application/json" }, body: JSON.stringify(body),
        });
      }
      const reply = await res.json();
      if (!res.ok) { add("assistant", "⚠️ " + reply.message); return; }
      if (!sessionId) { sessionId = reply.session_id; await loadSession(); return; }
      add("user", text);
      add("assistant", reply.response_text,
          reply.search_query ? "Used search for: " + reply.search_query : null);
    }

    document.getElementById("chat").onsubmit = async (ev) => {
      ev.preventDefault();
      const input = document.getElementById("text");
      const text = input.value.trim();
      if (!text) return;
      input.value = "";
      await send(text);
    };

    document.getElementById("clear").onclick = async () => {
      if (!sessionId) return;
      await fetch("/api/session/" + sessionId + "/clear", { method: "POST" });
      await loadSession();
    };

    loadSettings();
    add("assistant", "Hello! I'm your WCC Info Bot. Ask me anything about the Women Coding Community! 🚀");
  </script>
</body>
</html>
"#;

/// GET /
pub(super) async fn root() -> impl IntoResponse {
    Html(WIDGET_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_uses_api_routes() {
        for route in ["/api/settings", "/api/message", "/api/session/"] {
            assert!(WIDGET_HTML.contains(route), "missing {route}");
        }
    }
}
