/// Sanitize a name into a filesystem- and key-safe project slug:
/// lowercase, runs of non-alphanumeric characters collapsed to `-`,
/// leading/trailing separators trimmed.
pub fn project_slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Extract an `owner/repo` identity from a git remote URL and slug it.
/// Handles both `git@host:owner/repo.git` and `https://host/owner/repo.git`.
/// Returns `None` when the URL has no recognizable path.
pub fn slug_from_remote_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let path = if let Some((_, rest)) = trimmed.split_once("://") {
        // https://host/owner/repo(.git)
        rest.split_once('/').map(|(_, p)| p)?
    } else if let Some((_, rest)) = trimmed.split_once(':') {
        // git@host:owner/repo(.git)
        rest
    } else {
        return None;
    };
    let path = path.trim_end_matches(".git").trim_matches('/');
    if path.is_empty() {
        return None;
    }
    let slug = project_slug(path);
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_and_lowercases() {
        assert_eq!(project_slug("My Cool_Repo!"), "my-cool-repo");
        assert_eq!(project_slug("acme/api"), "acme-api");
        assert_eq!(project_slug("--weird--"), "weird");
    }

    #[test]
    fn slug_from_ssh_remote() {
        assert_eq!(
            slug_from_remote_url("git@github.com:Acme/API.git"),
            Some("acme-api".into())
        );
    }

    #[test]
    fn slug_from_https_remote() {
        assert_eq!(
            slug_from_remote_url("https://github.com/acme/api"),
            Some("acme-api".into())
        );
        assert_eq!(
            slug_from_remote_url("https://gitlab.com/group/sub/repo.git"),
            Some("group-sub-repo".into())
        );
    }

    #[test]
    fn slug_from_bad_remote_is_none() {
        assert_eq!(slug_from_remote_url(""), None);
        assert_eq!(slug_from_remote_url("not a url"), None);
    }
}
