//! HTML views.
//!
//! The front-end is a single page reflecting the authentication predicate;
//! rendering is plain string templating, no client-side code.

use gatehouse_session::UserClaims;

/// Renders the home page.
///
/// Shows the user's claims when authenticated, a login link otherwise, and
/// a generic failure banner when the callback redirected with an error
/// indicator. No internal error detail ever reaches this page.
pub fn home(claims: Option<&UserClaims>, error: Option<&str>) -> String {
    let banner = if error.is_some() {
        r#"<p class="error">Login failed. Please try again.</p>"#
    } else {
        ""
    };

    let body = match claims {
        Some(claims) => {
            let greeting = claims
                .display_name
                .as_deref()
                .or(claims.email.as_deref())
                .unwrap_or(claims.subject.as_str());
            format!(
                r#"<h1>Welcome, {}!</h1>
<dl>
  <dt>Subject</dt><dd>{}</dd>
  <dt>Email</dt><dd>{}</dd>
</dl>
<a href="/logout">Log out</a>"#,
                escape(greeting),
                escape(&claims.subject),
                escape(claims.email.as_deref().unwrap_or("(not released)")),
            )
        }
        None => r#"<h1>gatehouse</h1>
<p>You are not signed in.</p>
<a href="/login">Log in</a>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>gatehouse</title></head>
<body>
{banner}
{body}
</body>
</html>"#
    )
}

/// Escapes claim values for embedding in HTML text content.
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
    fn anonymous_page_offers_login() {
        let page = home(None, None);
        assert!(page.contains(r#"<a href="/login">"#));
        assert!(page.contains("not signed in"));
        assert!(!page.contains("Login failed"));
    }

    #[test]
    fn authenticated_page_shows_claims() {
        let claims = UserClaims::new("cognito|42".to_string())
            .with_email(Some("alice@example.com".to_string()))
            .with_display_name(Some("Alice".to_string()));
        let page = home(Some(&claims), None);

        assert!(page.contains("Welcome, Alice!"));
        assert!(page.contains("cognito|42"));
        assert!(page.contains("alice@example.com"));
        assert!(page.contains(r#"<a href="/logout">"#));
    }

    #[test]
    fn error_indicator_renders_generic_banner() {
        let page = home(None, Some("auth_failed"));
        assert!(page.contains("Login failed"));
        // The raw indicator value is not echoed back.
        assert!(!page.contains("auth_failed"));
    }

    #[test]
    fn claim_values_are_escaped() {
        let claims = UserClaims::new("<script>alert(1)</script>".to_string());
        let page = home(Some(&claims), None);
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
