use crate::admin::AdminCommand;
use crate::server::{ServerCommand, ServerTx};
use crate::server_state::RelayStatus;
use actix_web::error::ErrorInternalServerError;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web::Result;
use askama::Template;
use tokio::sync::oneshot;

#[derive(Template)]
#[template(path = "admin-index.html")]
pub struct AdminIndexTemplate {
    connections: usize,
    log_length: usize,
    reset_action: String,
}

pub fn configure_admin_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::resource("")
                    .name("admin_index")
                    .route(web::get().to(admin_index)),
            )
            .service(
                web::resource("/status")
                    .name("admin_status")
                    .route(web::get().to(status)),
            )
            .service(
                web::resource("/reset")
                    .name("admin_reset")
                    .route(web::post().to(reset)),
            ),
    );
}

async fn ask(
    srv_tx: &ServerTx,
    command: impl FnOnce(oneshot::Sender<RelayStatus>) -> AdminCommand,
) -> Result<RelayStatus> {
    let (tx, rx) = oneshot::channel();
    srv_tx
        .send(ServerCommand::from(command(tx)))
        .await
        .map_err(|_| ErrorInternalServerError("server task is not running"))?;
    rx.await
        .map_err(|_| ErrorInternalServerError("server task dropped the request"))
}

pub async fn admin_index(req: HttpRequest, srv_tx: web::Data<ServerTx>) -> Result<HttpResponse> {
    let status = ask(&srv_tx, |tx| AdminCommand::GetStatus { tx }).await?;
    let html = AdminIndexTemplate {
        connections: status.connections,
        log_length: status.log_length,
        reset_action: req.url_for_static("admin_reset")?.to_string(),
    }
    .render()
    .map_err(ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn status(srv_tx: web::Data<ServerTx>) -> Result<HttpResponse> {
    let status = ask(&srv_tx, |tx| AdminCommand::GetStatus { tx }).await?;
    Ok(HttpResponse::Ok().json(status))
}

pub async fn reset(req: HttpRequest, srv_tx: web::Data<ServerTx>) -> Result<HttpResponse> {
    ask(&srv_tx, |tx| AdminCommand::Reset { tx }).await?;
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, req.url_for_static("admin_index")?.to_string()))
        .finish())
}
