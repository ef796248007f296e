//! Server-rendered HTML pages.

use actix_web::http::StatusCode;

use crate::models::{Memo, MemoId};

/// Escape text for use in HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
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

fn layout(title: &str, signed_in_as: Option<&str>, body: &str) -> String {
    let nav = match signed_in_as {
        Some(name) => format!(
            r#"<nav><a href="/top">Memos</a> | <a href="/create">New memo</a> | {} | <a href="/logout">Log out</a></nav>"#,
            escape(name)
        ),
        None => r#"<nav><a href="/">Sign up</a> | <a href="/login">Log in</a></nav>"#.to_string(),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
{nav}
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        nav = nav,
        body = body,
    )
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, escape(e)))
        .unwrap_or_default()
}

fn credentials_form(action: &str, submit: &str, error: Option<&str>, user_name: &str) -> String {
    format!(
        r#"{error}<form method="post" action="{action}">
<label>Username <input type="text" name="user_name" maxlength="10" value="{user_name}" required></label>
<label>Password <input type="password" name="user_password" required></label>
<button type="submit">{submit}</button>
</form>"#,
        error = error_banner(error),
        action = action,
        user_name = escape(user_name),
        submit = submit,
    )
}

pub fn signup_page(error: Option<&str>, user_name: &str) -> String {
    let body = format!(
        "<h1>Sign up</h1>\n{}\n<p>Already registered? <a href=\"/login\">Log in</a></p>",
        credentials_form("/", "Sign up", error, user_name)
    );
    layout("Sign up", None, &body)
}

pub fn login_page(error: Option<&str>, user_name: &str) -> String {
    let body = format!(
        "<h1>Log in</h1>\n{}\n<p>No account yet? <a href=\"/\">Sign up</a></p>",
        credentials_form("/login", "Log in", error, user_name)
    );
    layout("Log in", None, &body)
}

pub fn memo_list(signed_in_as: Option<&str>, memos: &[Memo]) -> String {
    let items = if memos.is_empty() {
        "<p>No memos yet.</p>".to_string()
    } else {
        let rows: Vec<String> = memos
            .iter()
            .map(|memo| {
                format!(
                    r#"<li><a href="/detail/{id}">{title}</a> <a href="/update/{id}">Edit</a> <a href="/delete/{id}">Delete</a></li>"#,
                    id = memo.id,
                    title = escape(&memo.title),
                )
            })
            .collect();
        format!("<ul>\n{}\n</ul>", rows.join("\n"))
    };
    let body = format!(
        "<h1>Memos</h1>\n<p><a href=\"/create\">New memo</a></p>\n{}",
        items
    );
    layout("Memos", signed_in_as, &body)
}

fn memo_form(action: &str, submit: &str, error: Option<&str>, title: &str, content: &str) -> String {
    format!(
        r#"{error}<form method="post" action="{action}">
<label>Title <input type="text" name="title" maxlength="100" value="{title}" required></label>
<label>Content <textarea name="content" required>
{content}</textarea></label>
<button type="submit">{submit}</button>
</form>"#,
        error = error_banner(error),
        action = action,
        title = escape(title),
        content = escape(content),
        submit = submit,
    )
}

pub fn create_page(signed_in_as: Option<&str>, error: Option<&str>, title: &str, content: &str) -> String {
    let body = format!(
        "<h1>New memo</h1>\n{}",
        memo_form("/top", "Create", error, title, content)
    );
    layout("New memo", signed_in_as, &body)
}

pub fn detail_page(signed_in_as: Option<&str>, memo: &Memo) -> String {
    let body = format!(
        r#"<h1>{title}</h1>
<p class="meta">Created {created}, updated {updated}</p>
<pre class="content">{content}</pre>
<p><a href="/update/{id}">Edit</a> | <a href="/delete/{id}">Delete</a> | <a href="/top">Back</a></p>"#,
        title = escape(&memo.title),
        created = memo.created_at.format("%Y-%m-%d %H:%M"),
        updated = memo.updated_at.format("%Y-%m-%d %H:%M"),
        content = escape(&memo.content),
        id = memo.id,
    );
    layout(&memo.title, signed_in_as, &body)
}

pub fn update_page(
    signed_in_as: Option<&str>,
    id: MemoId,
    error: Option<&str>,
    title: &str,
    content: &str,
) -> String {
    let body = format!(
        "<h1>Edit memo</h1>\n{}",
        memo_form(&format!("/update/{}", id), "Save", error, title, content)
    );
    layout("Edit memo", signed_in_as, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let heading = match status {
        StatusCode::NOT_FOUND => "Not found",
        s if s.is_server_error() => "Server error",
        _ => status.canonical_reason().unwrap_or("Error"),
    };
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"/top\">Back to memos</a></p>",
        escape(heading),
        escape(message)
    );
    layout(heading, None, &body)
}
