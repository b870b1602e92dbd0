use serde_json::json;
use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
    thread,
};

pub(crate) const MIT_LICENSE: &str = "MIT License\n\nCopyright (c) [year] [fullname]\n";

/// Serves canned bodies over plain HTTP on a random local port.
///
/// `routes` gets the base url (`http://127.0.0.1:<port>`) so bodies can link back to
/// the server. Paths are matched without their query, unknown paths answer 404.
pub(crate) fn serve<F>(routes: F) -> String
where
    F: FnOnce(&str) -> Vec<(String, String)>,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let routes = routes(&base_url);

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            respond(stream, &routes);
        }
    });

    base_url
}

fn respond(mut stream: TcpStream, routes: &[(String, String)]) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut header = String::new();
    while reader.read_line(&mut header).map(|n| n > 2).unwrap_or(false) {
        header.clear();
    }

    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target);

    let (status, body) = match routes.iter().find(|(route, _)| route == path) {
        Some((_, body)) => ("200 OK", body.as_str()),
        None => ("404 Not Found", ""),
    };

    let _ = write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
}

/// License listing with a single `mit` entry; returns the listing url.
pub(crate) fn serve_licenses() -> String {
    let base_url = serve(|base| {
        let listing = json!([
            {"name": "mit.txt", "type": "file", "download_url": format!("{}/raw/mit.txt", base)},
            {"name": "drafts", "type": "dir", "download_url": null},
        ]);
        let text = format!("---\ntitle: MIT License\nspdx-id: MIT\n---\n\n{}", MIT_LICENSE);

        vec![
            ("/licenses".to_string(), listing.to_string()),
            ("/raw/mit.txt".to_string(), text),
        ]
    });

    format!("{}/licenses", base_url)
}
