//! The dashboard page.
//!
//! A single static document; all data is loaded from `/api/dashboard` and
//! re-fetched on a timer. Task checkboxes carry the task id and nothing
//! else, so a re-render never confuses two tasks. A failed login lands
//! here with `?auth_error=<code>`, which the page shows above the board.

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// GET / - The dashboard page
async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(state.refresh_interval().as_millis()))
}

fn render_page(refresh_ms: u128) -> String {
    PAGE.replace("__REFRESH_MS__", &refresh_ms.to_string())
}

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Today</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
  header { display: flex; justify-content: space-between; align-items: baseline; }
  .card { border: 1px solid #ddd; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1.5rem; }
  .card h2 { margin-top: 0; font-size: 1.2rem; }
  ul { list-style: none; padding: 0; margin: 0; }
  li { padding: 0.35rem 0; }
  .when { color: #666; font-size: 0.9rem; }
  .empty { color: #888; font-style: italic; }
  #error { color: #b00020; }
  form { display: flex; gap: 0.5rem; margin-top: 1rem; }
  form input { flex: 1; padding: 0.4rem; }
</style>
</head>
<body>
<header>
  <h1>Today <span id="date" class="when"></span></h1>
  <a id="session" href="/login">Log in</a>
</header>
<p id="error"></p>
<div id="login" hidden><p>Not authenticated. <a href="/login">Log in with Google</a> to see today's events and tasks.</p></div>
<div id="board" hidden>
  <section class="card">
    <h2>Today's events</h2>
    <ul id="events"></ul>
  </section>
  <section class="card">
    <h2>Today's tasks</h2>
    <ul id="tasks"></ul>
    <form id="add-task">
      <input id="new-title" type="text" placeholder="New task for today" autocomplete="off">
      <button type="submit">Add</button>
    </form>
  </section>
</div>
<script>
const REFRESH_MS = __REFRESH_MS__;

// Set by a failed OAuth callback; shown until a login succeeds.
let loginNotice = "";
const authError = new URLSearchParams(location.search).get("auth_error");
if (authError) {
  loginNotice = "Login failed (" + authError + "). Try again.";
  history.replaceState(null, "", location.pathname);
}

function formatTime(t) {
  if (t.type === "all_day") return t.value + " (all day)";
  return new Date(t.value).toLocaleTimeString([], { hour: "2-digit", minute: "2-digit" });
}

function item(text, cls) {
  const li = document.createElement("li");
  li.textContent = text;
  if (cls) li.className = cls;
  return li;
}

function render(snapshot) {
  if (snapshot.authenticated) loginNotice = "";
  document.getElementById("error").textContent = loginNotice;
  document.getElementById("date").textContent = snapshot.date;
  const session = document.getElementById("session");
  document.getElementById("login").hidden = snapshot.authenticated;
  document.getElementById("board").hidden = !snapshot.authenticated;
  session.textContent = snapshot.authenticated ? "Log out" : "Log in";
  session.href = snapshot.authenticated ? "/logout" : "/login";
  if (!snapshot.authenticated) return;

  const events = document.getElementById("events");
  events.replaceChildren();
  if (snapshot.events.length === 0) events.appendChild(item("No events today.", "empty"));
  for (const ev of snapshot.events) {
    const li = item(ev.title);
    const when = document.createElement("div");
    when.className = "when";
    when.textContent = formatTime(ev.start) + " - " + formatTime(ev.end);
    li.appendChild(when);
    events.appendChild(li);
  }

  const tasks = document.getElementById("tasks");
  tasks.replaceChildren();
  if (snapshot.tasks.length === 0) tasks.appendChild(item("No tasks for today.", "empty"));
  for (const task of snapshot.tasks) {
    const li = document.createElement("li");
    const label = document.createElement("label");
    const box = document.createElement("input");
    box.type = "checkbox";
    box.dataset.taskId = task.id;
    box.addEventListener("change", () => completeTask(box));
    label.appendChild(box);
    label.append(" " + task.title);
    li.appendChild(label);
    tasks.appendChild(li);
  }
}

function showError(message) {
  document.getElementById("error").textContent = message;
}

async function refresh() {
  try {
    const res = await fetch("/api/dashboard");
    const body = await res.json();
    if (!res.ok) return showError(body.error || res.statusText);
    render(body);
  } catch (e) {
    showError("Refresh failed: " + e);
  }
}

async function completeTask(box) {
  box.disabled = true;
  const res = await fetch("/api/tasks/" + encodeURIComponent(box.dataset.taskId) + "/complete", { method: "POST" });
  if (!res.ok) {
    box.disabled = false;
    box.checked = false;
    const body = await res.json().catch(() => ({}));
    showError(body.error || res.statusText);
  }
  refresh();
}

document.getElementById("add-task").addEventListener("submit", async (e) => {
  e.preventDefault();
  const input = document.getElementById("new-title");
  const title = input.value.trim();
  if (!title) return;
  const res = await fetch("/api/tasks", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ title }),
  });
  if (res.ok) {
    input.value = "";
  } else {
    const body = await res.json().catch(() => ({}));
    showError(body.error || res.statusText);
  }
  refresh();
});

refresh();
setInterval(refresh, REFRESH_MS);
</script>
</body>
</html>
"#;
