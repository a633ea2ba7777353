/// WebSocket session driving one table view
///
/// Each connection owns its own `TableController`. All connections share the
/// record source. Requests to the source run as futures on the actor's
/// context; their results are applied to the controller when they complete,
/// so a slow fetch never blocks filter or paging messages.
use actix::prelude::*;
use actix_web_actors::ws;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::controller::{fetch_rows, TableController, WriteKind};
use crate::entity::EntityKind;
use crate::error::SourceError;
use crate::messages::{ClientMessage, ServerMessage};
use crate::source::RecordSource;

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state for all WebSocket connections
pub struct AppState {
    pub source: Arc<dyn RecordSource>,
    pub page_size: usize,
}

impl AppState {
    pub fn new(source: Arc<dyn RecordSource>, page_size: usize) -> Self {
        Self { source, page_size }
    }
}

/// WebSocket connection actor
pub struct ViewSocket {
    hb: Instant,
    state: actix_web::web::Data<AppState>,
    controller: Option<TableController>,
    /// Bumped on every `Open`; results of requests sent for an older table are dropped
    session: u64,
    /// File name announced by `BeginImport`, consumed by the next binary frame
    pending_import: Option<String>,
}

impl ViewSocket {
    pub fn new(state: actix_web::web::Data<AppState>) -> Self {
        Self {
            hb: Instant::now(),
            state,
            controller: None,
            session: 0,
            pending_import: None,
        }
    }

    /// Replace the open table with a fresh controller for `entity`.
    fn install(&mut self, entity: EntityKind) -> u64 {
        let config = entity.config().with_page_size(self.state.page_size);
        self.controller = Some(TableController::new(config));
        self.pending_import = None;
        self.session += 1;
        self.session
    }

    /// The open controller, if it still belongs to `session`.
    fn controller_for(&mut self, session: u64) -> Option<&mut TableController> {
        if session != self.session {
            return None;
        }
        self.controller.as_mut()
    }

    /// Apply the outcome of a write sent during `session`.
    ///
    /// Returns None when another table has been opened since, otherwise
    /// whether the table must be refetched.
    fn finish_write(&mut self, session: u64, kind: WriteKind, result: Result<(), SourceError>) -> Option<bool> {
        let Some(controller) = self.controller_for(session) else {
            log::debug!("dropping {:?} result for a table that is no longer open", kind);
            return None;
        };
        match result {
            Ok(()) => {
                let follow_up = controller.write_succeeded(kind);
                controller.prepare_follow_up(follow_up);
                Some(true)
            }
            Err(err) => {
                controller.write_failed(kind, &err);
                Some(false)
            }
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                log::info!("websocket client heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send(&self, msg: &ServerMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("failed to encode server message: {}", e),
        }
    }

    fn send_error(&self, message: impl Into<String>, ctx: &mut ws::WebsocketContext<Self>) {
        self.send(&ServerMessage::Error { message: message.into() }, ctx);
    }

    /// Send queued notifications, then the current view.
    fn flush(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        let notifications = controller.take_notifications();
        let view = ServerMessage::View {
            view: Box::new(controller.snapshot()),
        };
        for notification in notifications {
            self.send(&ServerMessage::Notify { notification }, ctx);
        }
        self.send(&view, ctx);
    }

    fn open(&mut self, entity: EntityKind, ctx: &mut ws::WebsocketContext<Self>) {
        log::info!("opening {} table", entity);
        self.install(entity);
        self.refresh(ctx);
    }

    fn refresh(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(controller) = self.controller.as_mut() else {
            self.send_error("no table is open", ctx);
            return;
        };
        let ticket = controller.begin_fetch();
        let entity = controller.entity();
        let session = self.session;
        let source = self.state.source.clone();
        self.flush(ctx);

        async move { fetch_rows(source.as_ref(), entity).await }
            .into_actor(self)
            .map(move |result, act, ctx| {
                let Some(controller) = act.controller_for(session) else {
                    return;
                };
                match result {
                    Ok((rows, counts)) => {
                        // Rejected payloads are queued as notifications
                        let _ = controller.load_rows(ticket, rows, counts);
                    }
                    Err(err) => controller.load_failed(ticket, &err),
                }
                act.flush(ctx);
            })
            .spawn(ctx);
    }

    /// Run a write against the source and refetch once it succeeds.
    fn spawn_write<F>(&mut self, kind: WriteKind, write: F, ctx: &mut ws::WebsocketContext<Self>)
    where
        F: Future<Output = Result<(), SourceError>> + 'static,
    {
        let session = self.session;
        write
            .into_actor(self)
            .map(move |result, act, ctx| match act.finish_write(session, kind, result) {
                Some(true) => act.refresh(ctx),
                Some(false) => act.flush(ctx),
                None => {}
            })
            .spawn(ctx);
    }

    fn handle_client_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        if let ClientMessage::Open { entity } = msg {
            self.open(entity, ctx);
            return;
        }

        let Some(controller) = self.controller.as_mut() else {
            self.send_error("no table is open", ctx);
            return;
        };
        let entity = controller.entity();
        let source = self.state.source.clone();

        match msg {
            ClientMessage::Open { .. } => {}

            ClientMessage::Refresh => self.refresh(ctx),

            ClientMessage::RequestDelete { keys } => {
                let requested = match keys {
                    Some(keys) => controller.request_delete(keys),
                    None => controller.request_delete_selected(),
                };
                let count = controller.state().pending_delete.as_ref().map(Vec::len);
                if let (true, Some(count)) = (requested, count) {
                    self.send(&ServerMessage::ConfirmDelete { entity, count }, ctx);
                }
                self.flush(ctx);
            }

            ClientMessage::ConfirmDelete => match controller.take_pending_delete() {
                Ok(target) => {
                    let kind = WriteKind::Delete { count: target.len() };
                    self.spawn_write(kind, async move { source.delete(entity, &target).await }, ctx);
                }
                Err(e) => self.send_error(e.to_string(), ctx),
            },

            ClientMessage::Create { fields } => {
                self.spawn_write(
                    WriteKind::Create,
                    async move { source.create(entity, &fields).await },
                    ctx,
                );
            }

            ClientMessage::Update { key, fields } => {
                self.spawn_write(
                    WriteKind::Update,
                    async move { source.update(entity, &key, &fields).await },
                    ctx,
                );
            }

            ClientMessage::BeginImport { file_name } => {
                log::debug!("awaiting spreadsheet '{}' for {}", file_name, entity);
                self.pending_import = Some(file_name);
            }

            other => {
                if let Some(action) = other.into_action() {
                    controller.dispatch(action);
                }
                self.flush(ctx);
            }
        }
    }

    fn handle_binary(&mut self, bytes: Vec<u8>, ctx: &mut ws::WebsocketContext<Self>) {
        let (Some(file_name), Some(controller)) = (self.pending_import.take(), self.controller.as_ref()) else {
            self.send_error("unexpected binary frame; send BeginImport first", ctx);
            return;
        };
        let entity = controller.entity();
        let source = self.state.source.clone();
        log::info!("importing {} ({} bytes) into {}", file_name, bytes.len(), entity);
        self.spawn_write(
            WriteKind::Import,
            async move { source.bulk_import(entity, &file_name, bytes).await },
            ctx,
        );
    }
}

impl Actor for ViewSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ViewSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => self.handle_client_message(client_msg, ctx),
                Err(e) => self.send_error(format!("Invalid message format: {}", e), ctx),
            },
            Ok(ws::Message::Binary(bytes)) => self.handle_binary(bytes.to_vec(), ctx),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}
