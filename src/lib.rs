use std::io;
use std::sync::Arc;

use actix::Addr;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod agent;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod matchmaker;
pub mod protocol;
pub mod room;
pub mod session;

use catalog::CardCatalog;
use config::Settings;
use matchmaker::Matchmaker;
use session::SessionRegistry;

pub struct LoggerManager {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

impl LoggerManager {
    pub fn setup(settings: &Settings) -> Self {
        // 1. 파일 로거 설정
        let file_appender = RollingFileAppender::new(
            Rotation::DAILY,
            &settings.logging.directory,
            &settings.logging.filename,
        );
        let (non_blocking_file_writer, guard) = tracing_appender::non_blocking(file_appender);

        // 2. 로그 레벨 필터 설정 (환경 변수 또는 설정 파일 값)
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&settings.server.log_level));

        // 3. 콘솔 출력 레이어
        let console_layer = fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .pretty();

        // 4. 파일 출력 레이어
        let file_layer = fmt::layer()
            .with_writer(non_blocking_file_writer)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .pretty();

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        tracing::info!(
            "로거 초기화 완료: 콘솔 및 파일({}/{}) 출력 활성화.",
            settings.logging.directory,
            settings.logging.filename
        );

        Self { _guard: guard }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub catalog: Arc<CardCatalog>,
    pub matchmaker_addr: Addr<Matchmaker>,
    pub registry_addr: Addr<SessionRegistry>,
    pub logger_manager: Arc<LoggerManager>,
}
