use std::fmt;

use axum::{extract::State, response::Html};

use dashboard_types::models::{Notification, Task};

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// Everything shown on the dashboard page. Lists are newest first.
#[derive(Debug, Clone, Default)]
pub struct DashboardPage {
    pub rating: f64,
    pub notifications: Vec<Notification>,
    pub tasks: Vec<Task>,
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let user_id = state.config.user_id;
    let limit = state.config.page_size;

    let page = run_blocking(&state, move |db| {
        let rating = db.get_rating(user_id)?.map(|r| r.value).unwrap_or(0.0);
        let notifications = db
            .list_notifications(user_id, limit)?
            .into_iter()
            .map(Notification::from)
            .collect();
        let tasks = db
            .list_tasks(user_id, limit)?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(DashboardPage {
            rating,
            notifications,
            tasks,
        })
    })
    .await?;

    Ok(Html(page.to_string()))
}

/// HTML-escapes the wrapped text when displayed.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(pos) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..pos])?;
            f.write_str(match rest.as_bytes()[pos] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            })?;
            rest = &rest[pos + 1..];
        }
        f.write_str(rest)
    }
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

impl fmt::Display for DashboardPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "  <meta charset=\"utf-8\">\n",
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
            "  <title>Dashboard</title>\n",
            "  <link rel=\"stylesheet\" href=\"/css/style.css\">\n",
            "</head>\n",
            "<body>\n",
            "<main class=\"dashboard\">\n",
        ))?;

        writeln!(f, "<section class=\"rating\">")?;
        writeln!(f, "  <h2>Rating</h2>")?;
        writeln!(f, "  <p class=\"rating-value\">{}</p>", self.rating)?;
        writeln!(f, "</section>")?;

        writeln!(f, "<section class=\"notifications\">")?;
        writeln!(f, "  <h2>Notifications</h2>")?;
        if self.notifications.is_empty() {
            writeln!(f, "  <p class=\"empty\">No notifications</p>")?;
        } else {
            writeln!(f, "  <ul>")?;
            for n in &self.notifications {
                writeln!(
                    f,
                    "    <li><time datetime=\"{}\">{}</time><h3>{}</h3><p>{}</p></li>",
                    n.created_at.to_rfc3339(),
                    n.created_at.format(TIME_FORMAT),
                    Escaped(&n.subject),
                    Escaped(&n.body),
                )?;
            }
            writeln!(f, "  </ul>")?;
        }
        writeln!(f, "</section>")?;

        writeln!(f, "<section class=\"tasks\">")?;
        writeln!(f, "  <h2>Tasks</h2>")?;
        if self.tasks.is_empty() {
            writeln!(f, "  <p class=\"empty\">No tasks</p>")?;
        } else {
            writeln!(f, "  <table>")?;
            writeln!(
                f,
                "    <thead><tr><th>#</th><th>Title</th><th>Status</th><th>Assigned</th></tr></thead>"
            )?;
            writeln!(f, "    <tbody>")?;
            for t in &self.tasks {
                write!(f, "      <tr><td>{}</td><td>", t.task_id)?;
                if t.url.is_empty() {
                    write!(f, "{}", Escaped(&t.title))?;
                } else {
                    write!(f, "<a href=\"{}\">{}</a>", Escaped(&t.url), Escaped(&t.title))?;
                }
                writeln!(
                    f,
                    "</td><td class=\"status\">{}</td><td>{}</td></tr>",
                    Escaped(&t.status),
                    t.created_at.format(TIME_FORMAT),
                )?;
            }
            writeln!(f, "    </tbody>")?;
            writeln!(f, "  </table>")?;
        }
        writeln!(f, "</section>")?;

        f.write_str("</main>\n</body>\n</html>\n")
    }
}
