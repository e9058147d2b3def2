use std::{
    collections::{HashMap, VecDeque},
    io::{BufRead, BufReader, Read, Write},
    net::TcpListener,
    sync::{Arc, Mutex},
};

/// A request as the mock backend saw it.
#[derive(Clone, Debug)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

type Routes = HashMap<String, VecDeque<(u16, String)>>;

/// Loopback HTTP server answering canned JSON per `"METHOD /path"`.
///
/// Each route replays its responses in order and keeps repeating the last one.
pub struct MockBackend {
    url: String,
    routes: Arc<Mutex<Routes>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockBackend {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock backend");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let routes: Arc<Mutex<Routes>> = Arc::default();
        let seen: Arc<Mutex<Vec<SeenRequest>>> = Arc::default();
        let thread_routes = Arc::clone(&routes);
        let thread_seen = Arc::clone(&seen);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else {
                    continue;
                };
                let mut reader = BufReader::new(stream);
                let Some(request) = read_request(&mut reader) else {
                    continue;
                };
                let key = format!("{} {}", request.method, request.path);
                let (code, body) = next_response(&thread_routes, &key);
                thread_seen.lock().expect("seen lock").push(request);
                let response = format!(
                    "HTTP/1.1 {code} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    reason(code),
                    body.len()
                );
                let mut stream = reader.into_inner();
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        Self { url, routes, seen }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn respond(&self, route: &str, code: u16, body: &str) -> &Self {
        self.routes
            .lock()
            .expect("routes lock")
            .entry(route.to_string())
            .or_default()
            .push_back((code, body.to_string()));
        self
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("seen lock").clone()
    }

    pub fn hits(&self, route: &str) -> usize {
        self.seen()
            .iter()
            .filter(|request| format!("{} {}", request.method, request.path) == route)
            .count()
    }
}

fn next_response(routes: &Mutex<Routes>, key: &str) -> (u16, String) {
    let mut routes = routes.lock().expect("routes lock");
    match routes.get_mut(key) {
        Some(queue) if queue.len() > 1 => queue.pop_front().expect("queued response"),
        Some(queue) if !queue.is_empty() => queue[0].clone(),
        _ => (404, r#"{"detail": "Not Found"}"#.to_string()),
    }
}

fn read_request(reader: &mut BufReader<std::net::TcpStream>) -> Option<SeenRequest> {
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();
    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end().to_string();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.eq_ignore_ascii_case("content-length")
        {
            content_length = value.trim().parse().unwrap_or(0);
        }
        headers.push(line);
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    Some(SeenRequest {
        method,
        path,
        headers,
        body,
    })
}

fn reason(code: u16) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        _ => "Internal Server Error",
    }
}
