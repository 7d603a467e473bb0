use std::fmt::Debug;
use std::time::Duration;

use actix_web::{web, App};
use awc::ws;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{json, Value};

use server::connection::ConnectionSettings;
use server::handlers;
use server::server::spawn_server;
use system::{
    ClientMessage, Color, DrawingAction, Frame, LineStyle, Point, ServerMessage, StrokeSegment,
    WireFormat,
};

fn start() -> actix_test::TestServer {
    let srv_tx = spawn_server(64);
    actix_test::start(move || {
        App::new()
            .app_data(web::Data::new(srv_tx.clone()))
            .app_data(web::Data::new(ConnectionSettings { buffer: 64 }))
            .configure(handlers::root)
    })
}

fn drawing(x: f32) -> ClientMessage {
    ClientMessage::Drawing(DrawingAction::StrokeSegment(StrokeSegment {
        start: Point::new(x, x),
        end: Point::new(x + 1.0, x + 1.0),
        color: Color::new(255, 0, 0),
        width: 3.0,
        line_style: LineStyle::Solid,
    }))
}

async fn next_frame<S>(framed: &mut S) -> Frame
where
    S: Stream<Item = Result<ws::Frame, awc::error::WsProtocolError>> + Unpin,
{
    let frame = tokio::time::timeout(Duration::from_secs(5), framed.next())
        .await
        .expect("no frame within 5s")
        .expect("stream ended")
        .expect("protocol error");
    match frame {
        ws::Frame::Text(bytes) => Frame::Text(String::from_utf8(bytes.to_vec()).expect("")),
        ws::Frame::Binary(bytes) => Frame::Binary(bytes.to_vec()),
        other => panic!("unexpected frame: {:?}", other),
    }
}

async fn send_frame<S>(framed: &mut S, frame: Frame)
where
    S: Sink<ws::Message> + Unpin,
    S::Error: Debug,
{
    let message = match frame {
        Frame::Text(text) => ws::Message::Text(text.into()),
        Frame::Binary(bytes) => ws::Message::Binary(bytes.into()),
    };
    framed.send(message).await.expect("");
}

async fn status(srv: &actix_test::TestServer) -> Value {
    srv.get("/admin/status")
        .send()
        .await
        .expect("")
        .json::<Value>()
        .await
        .expect("")
}

/// The relay settles asynchronously after sockets close.
async fn wait_for_status(srv: &actix_test::TestServer, expected: Value) -> Value {
    let mut last = Value::Null;
    for _ in 0..100 {
        last = status(srv).await;
        if last == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    last
}

#[actix_web::test]
async fn it_should_speak_json_over_text_frames_by_default() {
    let mut srv = start();
    let mut x = srv.ws_at("/ws/").await.expect("");
    let mut y = srv.ws_at("/ws/?codec=json").await.expect("");

    for client in [&mut x, &mut y] {
        let frame = next_frame(client).await;
        assert_eq!(frame, Frame::Text(r#"{"loadDrawing":[]}"#.to_owned()));
    }

    send_frame(&mut x, WireFormat::Json.encode(&drawing(1.0)).expect("")).await;

    let frame = next_frame(&mut y).await;
    let received: ServerMessage = WireFormat::Json.decode(&frame).expect("");
    match (received, drawing(1.0)) {
        (ServerMessage::Drawing(received), ClientMessage::Drawing(sent)) => {
            assert_eq!(received, sent)
        }
        other => panic!("unexpected messages: {:?}", other),
    }
}

#[actix_web::test]
async fn it_should_speak_bincode_when_asked_and_accept_either_frame_kind() {
    let mut srv = start();
    let mut x = srv.ws_at("/ws/?codec=bincode").await.expect("");
    let mut y = srv.ws_at("/ws/?codec=json").await.expect("");

    let frame = next_frame(&mut x).await;
    assert!(matches!(frame, Frame::Binary(_)));
    assert_eq!(
        WireFormat::Bincode.decode::<ServerMessage>(&frame).expect(""),
        ServerMessage::LoadDrawing(vec![])
    );
    next_frame(&mut y).await;

    // bincode in from a json client, bincode out to a bincode client
    send_frame(&mut y, WireFormat::Bincode.encode(&drawing(2.0)).expect("")).await;
    let frame = next_frame(&mut x).await;
    assert!(matches!(
        WireFormat::Bincode.decode::<ServerMessage>(&frame).expect(""),
        ServerMessage::Drawing(_)
    ));

    // json in from a bincode client, json out to a json client
    send_frame(&mut x, WireFormat::Json.encode(&ClientMessage::ClearCanvas).expect("")).await;
    let frame = next_frame(&mut y).await;
    assert_eq!(frame, Frame::Text(r#""clearCanvas""#.to_owned()));
}

#[actix_web::test]
async fn it_should_ignore_undecodable_frames_and_stay_open() {
    let mut srv = start();
    let mut x = srv.ws_at("/ws/").await.expect("");
    let mut y = srv.ws_at("/ws/").await.expect("");
    next_frame(&mut x).await;
    next_frame(&mut y).await;

    send_frame(&mut x, Frame::Text("not a message".to_owned())).await;
    send_frame(&mut x, Frame::Binary(vec![0xff, 0xff, 0xff])).await;
    send_frame(&mut x, WireFormat::Json.encode(&drawing(3.0)).expect("")).await;

    let frame = next_frame(&mut y).await;
    assert!(matches!(
        WireFormat::Json.decode::<ServerMessage>(&frame).expect(""),
        ServerMessage::Drawing(_)
    ));
    assert_eq!(status(&srv).await, json!({ "connections": 2, "logLength": 1 }));
}

#[actix_web::test]
async fn it_should_deregister_clients_that_close_right_away() {
    let mut srv = start();

    for i in 0..50 {
        let mut client = srv.ws_at("/ws/").await.expect("");
        if i % 2 == 0 {
            client.send(ws::Message::Close(None)).await.expect("");
        }
        drop(client);
    }

    assert_eq!(
        wait_for_status(&srv, json!({ "connections": 0, "logLength": 0 })).await,
        json!({ "connections": 0, "logLength": 0 })
    );
}

#[actix_web::test]
async fn it_should_keep_frames_sent_right_after_the_handshake() {
    let mut srv = start();

    let mut clients = Vec::new();
    for i in 0..20 {
        let mut client = srv.ws_at("/ws/").await.expect("");
        send_frame(&mut client, WireFormat::Json.encode(&drawing(i as f32)).expect("")).await;
        clients.push(client);
    }

    assert_eq!(
        wait_for_status(&srv, json!({ "connections": 20, "logLength": 20 })).await,
        json!({ "connections": 20, "logLength": 20 })
    );

    let mut late = srv.ws_at("/ws/").await.expect("");
    match WireFormat::Json.decode::<ServerMessage>(&next_frame(&mut late).await) {
        Ok(ServerMessage::LoadDrawing(actions)) => assert_eq!(actions.len(), 20),
        other => panic!("expected loadDrawing, got {:?}", other),
    }
}
