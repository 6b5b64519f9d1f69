//! 程序入口：初始化日志、加载 JSON 文件，并以缩进文本树输出

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::fmt::SubscriberBuilder;

use json_tree_viewer::model::performance::run_performance_suite;
use json_tree_viewer::vm::bridge::{
    render_rows, ToggleAction, STATUS_EMPTY_TREE, STATUS_ERROR_PREFIX, STATUS_LOADED,
    STATUS_LOADING, STATUS_READY,
};
use json_tree_viewer::{ExpansionState, JsonModel};

const USAGE: &str =
    "用法: json_tree_viewer <file.json> [--strict] [--collapsed] [--dump] [--bench]";

/// 命令行选项
#[derive(Debug, Default, PartialEq, Eq)]
struct CliOptions {
    path: Option<PathBuf>,
    /// 先用 serde_json 校验，不合法时拒绝加载
    strict: bool,
    /// 不执行"全部展开"
    collapsed: bool,
    /// 以 JSON 输出全部节点快照
    dump: bool,
    bench: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut opts = CliOptions::default();
        for arg in args {
            match arg.as_str() {
                "--strict" => opts.strict = true,
                "--collapsed" => opts.collapsed = true,
                "--dump" => opts.dump = true,
                "--bench" => opts.bench = true,
                flag if flag.starts_with("--") => bail!("未知参数: {}\n{}", flag, USAGE),
                path => {
                    if opts.path.is_some() {
                        bail!("只能指定一个文件\n{}", USAGE);
                    }
                    opts.path = Some(PathBuf::from(path));
                }
            }
        }
        Ok(opts)
    }
}

fn run_bench() {
    for result in run_performance_suite() {
        println!(
            "{:<12} {:>6}ms  {}  {}",
            result.operation,
            result.duration_ms,
            if result.success { "ok" } else { "FAILED" },
            result.details
        );
    }
}

fn run(opts: &CliOptions) -> Result<()> {
    let Some(path) = opts.path.as_ref() else {
        bail!("{}", USAGE);
    };

    tracing::info!("{} {}", STATUS_LOADING, path.display());
    let mut model = JsonModel::new();
    let load = if opts.strict {
        model.load_file_strict(path)
    } else {
        model.load_file(path)
    };
    load.with_context(|| format!("{}无法加载 {}", STATUS_ERROR_PREFIX, path.display()))?;
    tracing::info!("{}: {} 个节点", STATUS_LOADED, model.node_count());

    let mut state = ExpansionState::new();
    if !opts.collapsed && ToggleAction::ExpandAll.apply(&model, &mut state).is_none() {
        tracing::warn!("{}", STATUS_EMPTY_TREE);
    }
    print!("{}", render_rows(&model, &state));

    if opts.dump {
        let snapshots = model.snapshots();
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    // 初始化日志输出（写到 stderr，stdout 留给树文本）
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();

    let opts = CliOptions::parse(std::env::args().skip(1))?;
    tracing::info!("{}", STATUS_READY);

    if opts.bench {
        run_bench();
        if opts.path.is_none() {
            return Ok(());
        }
    }

    run(&opts).map_err(|e| {
        tracing::error!("{:#}", e);
        e
    })
}
