use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process;

use clap::Parser;
use tiny_http::{Header, Response, Server};

/// Demo pages fetch fonts and model weights from these origins.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
     font-src 'self' https://fonts.gstatic.com; \
     script-src 'self' 'unsafe-eval'; \
     img-src 'self' data: blob:; \
     connect-src 'self' https://tfhub.dev https://storage.googleapis.com;";

/// Static file server for the facewatch demo page.
#[derive(Parser)]
#[command(name = "facewatch-serve")]
struct Cli {
    /// Directory of built assets to serve.
    #[arg(default_value = "dist")]
    root: PathBuf,

    /// Port to listen on.
    #[arg(long, default_value = "3000")]
    port: u16,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if !cli.root.is_dir() {
        return Err(format!("Asset directory not found: {}", cli.root.display()).into());
    }

    let server = Server::http(("0.0.0.0", cli.port)).map_err(|e| e.to_string())?;
    log::info!("serving {} on http://localhost:{}", cli.root.display(), cli.port);

    for request in server.incoming_requests() {
        let url = request.url().to_string();
        let (body, mime) = match load_asset(&cli.root, &url) {
            Ok(asset) => asset,
            Err(e) => {
                log::warn!("GET {url}: {e}");
                let _ = request.respond(Response::from_string("not found").with_status_code(404));
                continue;
            }
        };

        log::debug!("GET {url} -> {} bytes ({mime})", body.len());
        let mut response = Response::from_data(body);
        if let Some(h) = header("Content-Type", mime) {
            response = response.with_header(h);
        }
        if let Some(h) = header("Content-Security-Policy", CONTENT_SECURITY_POLICY) {
            response = response.with_header(h);
        }
        if let Err(e) = request.respond(response) {
            log::warn!("GET {url}: response failed: {e}");
        }
    }

    Ok(())
}

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

/// Resolve a request path against the asset root. Unknown paths fall back
/// to index.html so client-side routes resolve after a reload.
fn load_asset(root: &Path, url: &str) -> std::io::Result<(Vec<u8>, &'static str)> {
    let path = sanitize(root, url);
    let path = match path {
        Some(p) if p.is_file() => p,
        _ => root.join("index.html"),
    };
    let body = fs::read(&path)?;
    Ok((body, mime_for(&path)))
}

/// Map the URL path to a file under the root, refusing any traversal
/// components. Returns `None` for paths that try to escape.
fn sanitize(root: &Path, url: &str) -> Option<PathBuf> {
    let raw = url.split(['?', '#']).next().unwrap_or("");
    let trimmed = raw.trim_start_matches('/');
    if trimmed.is_empty() {
        return Some(root.join("index.html"));
    }

    let relative = Path::new(trimmed);
    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            _ => return None,
        }
    }
    Some(root.join(relative))
}

fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("onnx") => "application/octet-stream",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_paths() {
        let root = Path::new("/srv/dist");
        assert_eq!(
            sanitize(root, "/app.js"),
            Some(PathBuf::from("/srv/dist/app.js"))
        );
        assert_eq!(
            sanitize(root, "/assets/logo.png"),
            Some(PathBuf::from("/srv/dist/assets/logo.png"))
        );
    }

    #[test]
    fn test_sanitize_root_is_index() {
        let root = Path::new("/srv/dist");
        assert_eq!(
            sanitize(root, "/"),
            Some(PathBuf::from("/srv/dist/index.html"))
        );
    }

    #[test]
    fn test_sanitize_strips_query_and_fragment() {
        let root = Path::new("/srv/dist");
        assert_eq!(
            sanitize(root, "/app.js?v=3#frag"),
            Some(PathBuf::from("/srv/dist/app.js"))
        );
    }

    #[test]
    fn test_sanitize_refuses_traversal() {
        let root = Path::new("/srv/dist");
        assert_eq!(sanitize(root, "/../etc/passwd"), None);
        assert_eq!(sanitize(root, "/assets/../../etc/passwd"), None);
    }

    #[test]
    fn test_unknown_route_falls_back_to_index() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("index.html"), "<html>spa</html>").unwrap();

        let (body, mime) = load_asset(tmp.path(), "/some/client/route").unwrap();
        assert_eq!(body, b"<html>spa</html>");
        assert_eq!(mime, "text/html; charset=utf-8");
    }

    #[test]
    fn test_existing_asset_served_with_its_mime() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("index.html"), "x").unwrap();
        fs::write(tmp.path().join("app.css"), "body{}").unwrap();

        let (body, mime) = load_asset(tmp.path(), "/app.css").unwrap();
        assert_eq!(body, b"body{}");
        assert_eq!(mime, "text/css");
    }

    #[test]
    fn test_mime_defaults_to_octet_stream() {
        assert_eq!(mime_for(Path::new("weights.bin")), "application/octet-stream");
    }
}
