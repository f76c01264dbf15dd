//! # codetrail-app
//!
//! codetrail 바이너리 진입점.
//! 설정 로드, 어댑터 조립(DI), 호스트 이벤트 루프를 담당한다.

mod host_events;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codetrail_core::config::AppConfig;
use codetrail_core::config_manager::ConfigManager;
use codetrail_core::ports::sender::ActivitySender;
use codetrail_network::auth::TokenManager;
use codetrail_network::http_client::HttpActivitySender;
use codetrail_tracker::{
    resolver, ActivitySessionManager, EventOutcome, FlushOutcome, SourceTree, Tracker,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::host_events::HostMessage;

/// 에디터 커서 위치를 코드 경로 단위 작업 시간으로 기록하는 추적기
#[derive(Parser, Debug)]
#[command(name = "codetrail")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info", global = true)]
    log_level: String,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 파일의 문자 오프셋에서 코드 경로 식별자 출력
    Resolve {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        offset: usize,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// 수집 서버 로그인 후 토큰 저장
    Login {
        #[arg(long)]
        url: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// stdin의 호스트 이벤트(JSON 한 줄씩)를 받아 활동 추적
    Watch {
        /// 솔루션이 열리기 전 사용할 프로젝트 이름
        #[arg(long)]
        project: Option<String>,
    },
}

/// 설정 관리자 열기 (읽기 실패 시 빈 설정)
fn open_config(path: Option<PathBuf>) -> Result<ConfigManager> {
    let path = match path {
        Some(path) => path,
        None => ConfigManager::default_config_path()?,
    };
    let manager = ConfigManager::open_lenient(path);
    debug!("설정 파일: {}", manager.config_path().display());
    Ok(manager)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 로깅 초기화 (RUST_LOG 우선)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_manager = open_config(args.config)?;

    match args.command {
        Command::Resolve {
            file,
            offset,
            project,
            language,
        } => run_resolve(&config_manager.get(), file, offset, project, language),
        Command::Login {
            url,
            username,
            password,
        } => run_login(&config_manager, &url, &username, &password).await,
        Command::Watch { project } => run_watch(&config_manager.get(), project).await,
    }
}

/// `resolve`: 식별자 한 줄 출력
fn run_resolve(
    config: &AppConfig,
    file: PathBuf,
    offset: usize,
    project: Option<String>,
    language: Option<String>,
) -> Result<()> {
    let source = std::fs::read_to_string(&file)
        .with_context(|| format!("소스 파일 읽기 실패: {}", file.display()))?;
    let tree = SourceTree::parse(source)?;

    let project = project.unwrap_or_else(|| "undefined".to_string());
    let language = language.unwrap_or_else(|| config.tracker.default_language.clone());
    let path = resolver::resolve(&tree, offset, &project, &language)?;

    println!("{path}");
    Ok(())
}

/// `login`: 토큰 획득 후 url/자격증명/토큰 저장
async fn run_login(
    config_manager: &ConfigManager,
    url: &str,
    username: &str,
    password: &str,
) -> Result<()> {
    let tokens = TokenManager::new(url);
    let token = tokens
        .login(username.trim(), password)
        .await
        .context("로그인 실패")?;

    config_manager.update_with(|config| {
        config.server.base_url = url.to_string();
        config.credentials.username = username.to_string();
        config.credentials.password = password.to_string();
        config.credentials.token = token;
    })?;

    info!("로그인 성공, 설정 저장: {}", config_manager.config_path().display());
    Ok(())
}

/// 전송 포트 조립: 토큰이 없으면 저장된 자격증명으로 한 번 로그인 시도
async fn build_sender(config: &AppConfig) -> Result<Arc<dyn ActivitySender>> {
    let tokens = Arc::new(TokenManager::from_config(config));
    if let Err(e) = tokens.ensure_token(&config.credentials).await {
        // 전송은 실패하고 활동은 보관된다
        warn!("토큰 없음, `codetrail login` 필요: {e}");
    }
    let sender = HttpActivitySender::from_config(config, tokens)?;
    Ok(Arc::new(sender))
}

/// `watch`: 호스트 이벤트 루프
async fn run_watch(config: &AppConfig, project: Option<String>) -> Result<()> {
    let sender = build_sender(config).await?;

    let mut session = ActivitySessionManager::from_config(&config.tracker);
    if let Some(project) = project {
        session.set_project_name(project);
    }
    let tracker = Tracker::new(session, sender);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("호스트 이벤트 대기");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => handle_line(&tracker, &line).await,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("종료 신호 수신");
                break;
            }
        }
    }

    // 입력 종료 시 남은 활동 전송
    report_flush(tracker.flush().await);
    Ok(())
}

async fn handle_line(tracker: &Tracker, line: &str) {
    let event = match HostMessage::parse(line).and_then(HostMessage::into_event) {
        Ok(event) => event,
        Err(e) => {
            warn!("호스트 메시지 무시: {e}");
            return;
        }
    };

    match tracker.dispatch(event).await {
        EventOutcome::Location(outcome) => debug!("위치 처리: {outcome:?}"),
        EventOutcome::Flush(outcome) => report_flush(outcome),
        EventOutcome::ProjectChanged(name) => debug!("프로젝트: {name}"),
    }
}

fn report_flush(outcome: FlushOutcome) {
    match outcome {
        FlushOutcome::Empty => debug!("전송할 활동 없음"),
        FlushOutcome::Sent { count } => info!("활동 {count}개 전송"),
        FlushOutcome::Retained { count } => error!("활동 {count}개 전송 실패, 보관"),
    }
}
