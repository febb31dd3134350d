//! Static file serving.
//!
//! # Responsibilities
//! - Map request paths onto files below a root directory
//! - Serve `index.html` for directories
//! - Report missing files through the normal `404` path so intercepts can
//!   act on them
//!
//! # Design Decisions
//! - Only GET and HEAD are served
//! - Any `..` segment is treated as not found
//! - Content type is guessed from the file extension, octet-stream otherwise

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::http::header::{ALLOW, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use percent_encoding::percent_decode_str;

use super::{error, Handler, NotFound};
use crate::writer::ResponseWriter;

/// Serves files from a directory tree.
#[derive(Debug, Clone)]
pub struct FileServer {
    root: PathBuf,
}

impl FileServer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a request path to a location under the root.
    fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode(request_path)?;
        let mut path = self.root.clone();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if s.contains('\\') || s.contains('\0') => return None,
                s => path.push(s),
            }
        }
        Some(path)
    }
}

impl Handler for FileServer {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
        if req.method() != Method::GET && req.method() != Method::HEAD {
            w.headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            error(w, "405 method not allowed", StatusCode::METHOD_NOT_ALLOWED);
            return;
        }

        let request_path = req.uri().path();
        let Some(mut path) = self.resolve(request_path) else {
            NotFound.serve(w, req);
            return;
        };

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                reply_io_error(w, req, &e);
                return;
            }
        };

        if metadata.is_dir() {
            if !request_path.ends_with('/') {
                redirect_to_dir(w, req);
                return;
            }
            path.push("index.html");
            if !path.is_file() {
                NotFound.serve(w, req);
                return;
            }
        }

        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) => {
                reply_io_error(w, req, &e);
                return;
            }
        };

        w.headers_mut().insert(CONTENT_TYPE, content_type(&path));
        w.write_header(StatusCode::OK);

        if req.method() == Method::HEAD {
            return;
        }
        if let Err(e) = w.write(&contents) {
            tracing::debug!(path = %path.display(), error = %e, "Failed to write file body");
        }
    }
}

fn reply_io_error(w: &mut dyn ResponseWriter, req: &Request<Bytes>, e: &io::Error) {
    match e.kind() {
        io::ErrorKind::NotFound => NotFound.serve(w, req),
        io::ErrorKind::PermissionDenied => error(w, "403 Forbidden", StatusCode::FORBIDDEN),
        _ => {
            tracing::error!(path = %req.uri().path(), error = %e, "Failed to read file");
            error(
                w,
                "500 Internal Server Error",
                StatusCode::INTERNAL_SERVER_ERROR,
            );
        }
    }
}

/// Directories are only served with a trailing slash so relative links resolve.
fn redirect_to_dir(w: &mut dyn ResponseWriter, req: &Request<Bytes>) {
    let mut target = format!("{}/", req.uri().path());
    if let Some(query) = req.uri().query() {
        target.push('?');
        target.push_str(query);
    }

    match HeaderValue::from_str(&target) {
        Ok(value) => {
            w.headers_mut().insert(LOCATION, value);
            w.write_header(StatusCode::MOVED_PERMANENTLY);
        }
        Err(_) => NotFound.serve(w, req),
    }
}

fn content_type(path: &Path) -> HeaderValue {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    HeaderValue::from_str(mime.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

/// Decode `%XX` escapes. Malformed escapes are kept literally; non-UTF-8
/// output yields `None`.
fn percent_decode(input: &str) -> Option<String> {
    percent_decode_str(input)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ResponseBuffer;

    fn get(path: &str) -> Request<Bytes> {
        Request::builder().uri(path).body(Bytes::new()).unwrap()
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "Hello world!\n").unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs").join("index.html"), "<h1>docs</h1>").unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        dir
    }

    #[test]
    fn test_serves_file() {
        let dir = site();
        let files = FileServer::new(dir.path());

        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &get("/hello.txt"));
        assert_eq!(buffer.status(), Some(StatusCode::OK));
        assert_eq!(buffer.body(), b"Hello world!\n");
        assert_eq!(buffer.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = site();
        let files = FileServer::new(dir.path());

        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &get("/nope.txt"));
        assert_eq!(buffer.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(buffer.body(), b"404 page not found\n");
    }

    #[test]
    fn test_directory_index() {
        let dir = site();
        let files = FileServer::new(dir.path());

        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &get("/docs/"));
        assert_eq!(buffer.status(), Some(StatusCode::OK));
        assert_eq!(buffer.body(), b"<h1>docs</h1>");

        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &get("/docs?page=2"));
        assert_eq!(buffer.status(), Some(StatusCode::MOVED_PERMANENTLY));
        assert_eq!(buffer.headers().get(LOCATION).unwrap(), "/docs/?page=2");

        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &get("/empty/"));
        assert_eq!(buffer.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_traversal_is_not_found() {
        let dir = site();
        let files = FileServer::new(dir.path().join("docs"));

        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &get("/../hello.txt"));
        assert_eq!(buffer.status(), Some(StatusCode::NOT_FOUND));

        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &get("/%2e%2e/hello.txt"));
        assert_eq!(buffer.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_head_and_method_not_allowed() {
        let dir = site();
        let files = FileServer::new(dir.path());

        let head = Request::builder()
            .method(Method::HEAD)
            .uri("/hello.txt")
            .body(Bytes::new())
            .unwrap();
        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &head);
        assert_eq!(buffer.status(), Some(StatusCode::OK));
        assert!(buffer.body().is_empty());

        let post = Request::builder()
            .method(Method::POST)
            .uri("/hello.txt")
            .body(Bytes::new())
            .unwrap();
        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &post);
        assert_eq!(buffer.status(), Some(StatusCode::METHOD_NOT_ALLOWED));
        assert_eq!(buffer.headers().get(ALLOW).unwrap(), "GET, HEAD");
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("/a%20b").as_deref(), Some("/a b"));
        assert_eq!(percent_decode("/plain").as_deref(), Some("/plain"));
        assert_eq!(percent_decode("/bad%2").as_deref(), Some("/bad%2"));
        assert_eq!(percent_decode("/bad%zz").as_deref(), Some("/bad%zz"));
        assert_eq!(percent_decode("/a%+1").as_deref(), Some("/a%+1"));
        assert_eq!(percent_decode("/%ff"), None);
    }

    #[test]
    fn test_malformed_escape_is_not_decoded() {
        let dir = site();
        fs::write(dir.path().join("a\u{1}"), "control").unwrap();
        let files = FileServer::new(dir.path());

        assert_eq!(files.resolve("/a%+1"), Some(dir.path().join("a%+1")));

        let mut buffer = ResponseBuffer::new();
        files.serve(&mut buffer, &get("/a%+1"));
        assert_eq!(buffer.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(content_type(Path::new("index.html")), "text/html");
        assert_eq!(content_type(Path::new("logo.png")), "image/png");
        assert_eq!(
            content_type(Path::new("blob.unknownext")),
            "application/octet-stream"
        );
        assert_eq!(content_type(Path::new("no_extension")), "application/octet-stream");
    }
}
