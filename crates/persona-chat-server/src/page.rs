//! The single chat page served at `/`.
//!
//! The page keeps the conversation history in the browser and posts it
//! back with every message; the server holds no per-visitor state.

const TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Chat with {{NAME}}</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #222; }
  #log { border: 1px solid #ddd; border-radius: 8px; height: 420px; overflow-y: auto; padding: 1rem; }
  .msg { margin: .5rem 0; padding: .5rem .75rem; border-radius: 8px; white-space: pre-wrap; }
  .user { background: #e8f0fe; margin-left: 20%; }
  .assistant { background: #f4f4f4; margin-right: 20%; }
  form.row { display: flex; gap: .5rem; margin-top: .75rem; }
  form.row input { flex: 1; padding: .5rem; }
  .examples button { margin: .25rem .25rem 0 0; }
  details { margin-top: 1.5rem; }
  details input, details textarea { display: block; width: 100%; margin: .25rem 0 .5rem; padding: .4rem; box-sizing: border-box; }
</style>
</head>
<body>
<h1>Chat with {{NAME}}</h1>
<p>Ask about background, skills, and experience.</p>

<div id="log"></div>

<form id="chat" class="row">
  <input id="message" name="message" autocomplete="off" placeholder="Type your question and press Enter…">
  <button type="submit">Send</button>
</form>

<div class="examples">
  <p>Try one of these</p>
  {{EXAMPLES}}
</div>

<details>
  <summary>Get in touch</summary>
  <form id="contact">
    <label>Your name <input id="contact-name" placeholder="Jane Doe"></label>
    <label>Email <input id="contact-email" type="email" placeholder="jane@example.com"></label>
    <label>Notes (optional) <textarea id="contact-notes" placeholder="Tell me a bit about your needs…"></textarea></label>
    <button type="submit">Send contact details</button>
  </form>
</details>

<script>
const state = {
  history: [],
  sessionId: (window.crypto && crypto.randomUUID) ? crypto.randomUUID() : String(Date.now()),
};

function render() {
  const log = document.getElementById("log");
  log.replaceChildren(...state.history.map((m) => {
    const div = document.createElement("div");
    div.className = "msg " + m.role;
    div.textContent = m.content;
    return div;
  }));
  log.scrollTop = log.scrollHeight;
}

async function post(url, body) {
  const res = await fetch(url, {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify({ ...body, history: state.history, session_id: state.sessionId }),
  });
  const data = await res.json();
  state.history = data.history;
  render();
  return data;
}

document.getElementById("chat").addEventListener("submit", async (e) => {
  e.preventDefault();
  const input = document.getElementById("message");
  const message = input.value;
  input.value = "";
  await post("/api/chat", { message });
});

document.querySelectorAll(".examples button").forEach((b) => {
  b.addEventListener("click", () => {
    document.getElementById("message").value = b.textContent;
  });
});

document.getElementById("contact").addEventListener("submit", async (e) => {
  e.preventDefault();
  const fields = ["name", "email", "notes"].map((f) => document.getElementById("contact-" + f));
  const [name, email, notes] = fields.map((f) => f.value);
  await post("/api/contact", { name, email, notes });
  fields.forEach((f) => { f.value = ""; });
});
</script>
</body>
</html>
"##;

/// Example questions offered under the chat box.
pub fn example_questions(name: &str) -> [String; 3] {
    [
        format!("What kinds of projects has {name} worked on?"),
        format!("What is {name}'s current role and expertise?"),
        format!("Can {name} help with an AI/LLM project?"),
    ]
}

/// Renders the chat page for `name`.
pub fn render(name: &str) -> String {
    let examples = example_questions(name)
        .iter()
        .map(|q| format!(r#"<button type="button">{}</button>"#, escape_html(q)))
        .collect::<Vec<_>>()
        .join("\n  ");

    TEMPLATE
        .replace("{{NAME}}", &escape_html(name))
        .replace("{{EXAMPLES}}", &examples)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
