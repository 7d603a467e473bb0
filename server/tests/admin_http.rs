use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::json;

use server::connection::{ConnectionCommand, ConnectionEvent, ConnectionSettings};
use server::handlers;
use server::server::{spawn_server, ServerTx};
use system::{ClientMessage, Color, DrawingAction, Point, Shape, ShapeKind};
use tokio::sync::mpsc;

async fn connect_and_draw(srv_tx: &ServerTx) -> mpsc::Receiver<ConnectionEvent> {
    let (tx, mut rx) = mpsc::channel(16);
    srv_tx
        .send(ConnectionCommand::Connect { tx }.into())
        .await
        .expect("");
    let from = match rx.recv().await {
        Some(ConnectionEvent::Connected { connection_id }) => connection_id,
        other => panic!("expected Connected, got {:?}", other),
    };
    let action = DrawingAction::Shape(Shape {
        kind: ShapeKind::Line,
        start: Point::new(0.0, 0.0),
        end: Point::new(100.0, 0.0),
        color: Color::BLACK,
        width: 2.0,
    });
    srv_tx
        .send(
            ConnectionCommand::Message {
                from,
                message: ClientMessage::Drawing(action),
            }
            .into(),
        )
        .await
        .expect("");
    rx
}

#[actix_web::test]
async fn it_should_report_status_as_json() {
    let srv_tx = spawn_server(16);
    let _rx = connect_and_draw(&srv_tx).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(srv_tx.clone()))
            .app_data(web::Data::new(ConnectionSettings { buffer: 16 }))
            .configure(handlers::root),
    )
    .await;

    let req = test::TestRequest::get().uri("/admin/status").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "connections": 1, "logLength": 1 }));
}

#[actix_web::test]
async fn it_should_render_console_and_reset() {
    let srv_tx = spawn_server(16);
    let _rx = connect_and_draw(&srv_tx).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(srv_tx.clone()))
            .configure(handlers::root),
    )
    .await;

    let req = test::TestRequest::get().uri("/admin").to_request();
    let html = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(html.to_vec()).expect("");
    assert!(html.contains("<dd id=\"log-length\">1</dd>"), "{}", html);
    assert!(html.contains("/admin/reset\""), "{}", html);

    let req = test::TestRequest::post().uri("/admin/reset").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp.headers().get(header::LOCATION).expect("");
    assert!(location.to_str().expect("").ends_with("/admin"));

    let req = test::TestRequest::get().uri("/admin/status").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["logLength"], 0);
}
