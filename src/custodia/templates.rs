//! Rendered HTML and email bodies for the recovery flow.
//!
//! Plain string rendering; the recovery pages are intentionally small and
//! self-contained (inline styles, no assets).

const STYLE: &str = r"
            * {
                font-family: Helvetica, Arial, sans-serif;
                text-align: center;
            }
            form, body, h2 {
                margin-top: 44px;
            }
            body {
                width: 300px;
                margin-left: auto;
                margin-right: auto;
            }
            h1 {
                font-size: large;
                color: #434343;
            }
            h2 {
                font-size: medium;
                margin-bottom: 44px;
                color: #818181;
            }
            p.input {
                text-align: left;
            }
            input {
                width: 300px;
                border: solid 1px #eeeeee;
                border-radius: 4px;
                text-align: left;
                padding: 12px 4px 12px 4px;
                margin-top: 6px;
                font-size: small;
            }
            input[disabled] {
                background-color: #F6F6F6;
            }
            button {
                margin-top: 22px;
                color: white;
                background-color: #5f80b5;
                border: none;
                border-radius: 4px;
                font-size: medium;
                padding: 8px 12px 8px 12px;
            }
";

/// Plain-text and HTML bodies for the recovery email.
#[must_use]
pub fn recovery_email(link: &str) -> (String, String) {
    let service = env!("CARGO_PKG_NAME");

    let text = format!(
        "A password recovery has been requested for your {service} account.\n\
         \n\
         Open the link below to choose a new password:\n\
         {link}\n\
         \n\
         If you did not request this, you can safely ignore this email.\n"
    );

    let html = format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>{service} - Password recovery</title>
        <style>{STYLE}</style>
    </head>
    <body>
        <h1>Password recovery</h1>
        <h2>A password recovery has been requested for your {service} account.</h2>
        <p><a href="{link}">Choose a new password</a></p>
        <p>If you did not request this, you can safely ignore this email.</p>
    </body>
</html>
"#
    );

    (text, html)
}

/// HTML form asking for the new password, posted to `action`.
#[must_use]
pub fn recovery_form(email: &str, action: &str) -> String {
    let service = env!("CARGO_PKG_NAME");
    let email = escape(email);
    let action = escape(action);

    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>{service} - Password recovery</title>
        <style>{STYLE}</style>
        <script type="text/javascript">
            window.onload = function () {{
                document.getElementById('password').focus();
            }}
        </script>
    </head>
    <body>
        <h1>Password recovery</h1>
        <form method="post" action="{action}">
            <h2>Please choose a new password:</h2>
            <p class="input">
                <label>Email:</label> <input id="email" name="email" type="email" value="{email}" disabled />
            </p>
            <p class="input">
                <label>Password:</label> <input id="password" name="password" type="password" value="" />
            </p>
            <p class="input">
                <label>Password again:</label> <input id="verification" name="verification" type="password" value="" />
            </p>
            <p><button type="submit">Save</button></p>
        </form>
    </body>
</html>
"#
    )
}

/// Minimal confirmation page.
#[must_use]
pub fn info_page(title: &str, text: &str) -> String {
    let service = env!("CARGO_PKG_NAME");
    let title = escape(title);
    let text = escape(text);

    format!(
        r"<!DOCTYPE html>
<html>
    <head>
        <title>{service} - {title}</title>
        <style>{STYLE}</style>
    </head>
    <body>
        <h1>{title}</h1>
        <h2>{text}</h2>
    </body>
</html>
"
    )
}

/// Minimal HTML escaping for values interpolated into pages.
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_email_embeds_link_in_both_bodies() {
        let link = "https://api.custodia.dev/auth/input-recovery?token=abc";
        let (text, html) = recovery_email(link);

        assert!(text.contains(link));
        assert!(html.contains(link));
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn recovery_form_posts_to_action() {
        let form = recovery_form("alice@example.com", "/auth/finish-recovery?token=abc");

        assert!(form.contains(r#"action="/auth/finish-recovery?token=abc""#));
        assert!(form.contains(r#"name="password""#));
        assert!(form.contains(r#"name="verification""#));
        assert!(form.contains("alice@example.com"));
    }

    #[test]
    fn info_page_contains_title_and_text() {
        let page = info_page("Success", "Your password has been changed");

        assert!(page.contains("Success"));
        assert!(page.contains("Your password has been changed"));
    }

    #[test]
    fn values_are_escaped() {
        let form = recovery_form("<script>@example.com", "/x?a=\"b\"");
        assert!(!form.contains("<script>@example.com"));
        assert!(form.contains("&lt;script&gt;@example.com"));

        let page = info_page("<b>", "a & b");
        assert!(page.contains("&lt;b&gt;"));
        assert!(page.contains("a &amp; b"));
    }
}
