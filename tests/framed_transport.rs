//! Calls over the framed byte-stream transport.

use std::io::Cursor;
use std::net::{TcpListener, TcpStream};
use std::thread;

use ipc_call::demo::{self, api};
use ipc_call::transport::framed::{read_frame, write_frame, MODE_SYNC, STATUS_ERROR, STATUS_OK};
use ipc_call::transport::{serve, DEFAULT_MAX_FRAME_BYTES};
use ipc_call::{Dispatcher, FramedTransport, TransportError};

// =============================================================================
// In-memory streams
// =============================================================================

/// Record the frames a client would send, replay them through `serve`, and
/// return the server's output stream.
fn serve_recorded(requests: Vec<u8>) -> Vec<u8> {
    let dispatcher = Dispatcher::new(demo::registry());
    let mut output = Vec::new();
    serve(
        &dispatcher,
        &mut Cursor::new(requests),
        &mut output,
        DEFAULT_MAX_FRAME_BYTES,
    )
    .unwrap();
    output
}

#[test]
fn test_serve_answers_each_sync_frame() {
    let mut requests = Vec::new();
    for (a, b) in [(1, 2), (40, 2)] {
        let request = api::sum::call(a, b).request().unwrap();
        write_frame(&mut requests, MODE_SYNC, &request, DEFAULT_MAX_FRAME_BYTES).unwrap();
    }

    let output = serve_recorded(requests);
    let mut reader = Cursor::new(output);

    let (status, payload) = read_frame(&mut reader, DEFAULT_MAX_FRAME_BYTES).unwrap().unwrap();
    assert_eq!((status, payload), (STATUS_OK, 3i32.to_le_bytes().to_vec()));
    let (status, payload) = read_frame(&mut reader, DEFAULT_MAX_FRAME_BYTES).unwrap().unwrap();
    assert_eq!((status, payload), (STATUS_OK, 42i32.to_le_bytes().to_vec()));
    assert!(read_frame(&mut reader, DEFAULT_MAX_FRAME_BYTES).unwrap().is_none());
}

#[test]
fn test_serve_reports_dispatch_error_as_frame() {
    let mut requests = Vec::new();
    let request = api::sum::call(1, 2).named("product").request().unwrap();
    write_frame(&mut requests, MODE_SYNC, &request, DEFAULT_MAX_FRAME_BYTES).unwrap();

    let output = serve_recorded(requests);
    let (status, payload) = read_frame(&mut Cursor::new(output), DEFAULT_MAX_FRAME_BYTES)
        .unwrap()
        .unwrap();

    assert_eq!(status, STATUS_ERROR);
    assert_eq!(
        String::from_utf8(payload).unwrap(),
        "IPC function 'product' is not registered"
    );
}

#[test]
fn test_client_sees_remote_error() {
    let mut response = Vec::new();
    write_frame(&mut response, STATUS_ERROR, b"no such function", DEFAULT_MAX_FRAME_BYTES).unwrap();

    let mut transport = FramedTransport::new(Cursor::new(response), Vec::new());
    let err = api::sum::call(1, 2).sync(&mut transport).unwrap_err();

    assert!(matches!(err, TransportError::Remote(ref message) if message == "no such function"));
}

#[test]
fn test_client_sees_closed_stream() {
    let mut transport = FramedTransport::new(Cursor::new(Vec::new()), Vec::new());
    let err = api::sum::call(1, 2).sync(&mut transport).unwrap_err();
    assert!(matches!(err, TransportError::Closed));
}

// =============================================================================
// TCP
// =============================================================================

#[test]
fn test_calls_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = stream.try_clone().unwrap();
        let mut writer = stream;
        let dispatcher = Dispatcher::new(demo::registry());
        serve(&dispatcher, &mut reader, &mut writer, DEFAULT_MAX_FRAME_BYTES).unwrap()
    });

    let stream = TcpStream::connect(addr).unwrap();
    let reader = stream.try_clone().unwrap();
    let mut transport = FramedTransport::new(reader, stream);

    let (mut a, mut b) = (10, 20);
    api::swap::call(&mut a, &mut b).sync(&mut transport).unwrap();
    assert_eq!((a, b), (20, 10));

    let lines = demo::run(&mut transport).unwrap();
    assert_eq!(lines.len(), 6);

    let (_, stream) = transport.into_inner();
    stream.shutdown(std::net::Shutdown::Write).unwrap();

    let stats = server.join().unwrap();
    assert_eq!(stats.sync_calls, 6);
    assert_eq!(stats.async_calls, 1);
    assert_eq!(stats.failed_calls, 0);
}
