//! 性能基准测试模块
//!
//! 用于测试宽松加载、严格校验和树导航的性能

use std::time::Instant;

use serde_json::{json, Value};

use crate::model::data_core::JsonModel;
use crate::model::expansion::ExpansionState;

/// 性能测试结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }
}

/// 生成大型测试JSON数据
pub fn generate_large_json(depth: usize, width: usize) -> Value {
    fn create_nested_object(current_depth: usize, max_depth: usize, width: usize) -> Value {
        if current_depth >= max_depth {
            return json!("leaf");
        }

        let mut obj = serde_json::Map::new();

        // 添加各种类型的字段
        for i in 0..width {
            let key = format!("field_{}", i);
            let value = match i % 5 {
                0 => json!(format!("字符串值_{}", i)),
                1 => json!(i as i64),
                2 => json!(i % 2 == 0),
                3 => json!([1, 2, 3, i]),
                4 => create_nested_object(current_depth + 1, max_depth, width / 2),
                _ => json!(null),
            };
            obj.insert(key, value);
        }

        Value::Object(obj)
    }

    let mut root = serde_json::Map::new();
    root.insert("metadata".to_string(), json!({
        "depth": depth,
        "width": width,
        "description": "性能测试用大型JSON文档"
    }));

    root.insert("data".to_string(), create_nested_object(0, depth, width));

    // 添加大型数组
    let large_array: Vec<Value> = (0..width * 10)
        .map(|i| json!({
            "id": i,
            "name": format!("项目_{}", i),
            "value": i * 2,
            "active": i % 3 == 0
        }))
        .collect();
    root.insert("items".to_string(), json!(large_array));

    Value::Object(root)
}

/// 生成 levels 层嵌套数组文本，例如 3 -> "[[[]]]"
pub fn generate_nested_arrays(levels: usize) -> String {
    format!("{}{}", "[".repeat(levels), "]".repeat(levels))
}

/// 测试宽松加载（解析 + 建树）性能
pub fn benchmark_lenient_load(json_str: &str) -> (JsonModel, PerformanceResult) {
    let mut model = JsonModel::new();
    let start = Instant::now();
    let result = model.try_load_json(json_str.as_bytes());
    let duration = start.elapsed();

    let perf = match result {
        Ok(()) => PerformanceResult::new(
            "宽松加载",
            duration.as_millis(),
            true,
            &format!("构建了 {} 个节点", model.node_count()),
        ),
        Err(e) => PerformanceResult::new(
            "宽松加载",
            duration.as_millis(),
            false,
            &format!("加载失败: {}", e),
        ),
    };
    (model, perf)
}

/// 测试严格校验（serde_json）性能
pub fn benchmark_strict_parse(json_str: &str) -> PerformanceResult {
    let start = Instant::now();
    let parse_result = serde_json::from_str::<Value>(json_str);
    let duration = start.elapsed();

    match parse_result {
        Ok(_) => PerformanceResult::new(
            "严格校验",
            duration.as_millis(),
            true,
            &format!("校验了 {} 字节的JSON", json_str.len())
        ),
        Err(e) => PerformanceResult::new(
            "严格校验",
            duration.as_millis(),
            false,
            &format!("校验失败: {}", e)
        )
    }
}

/// 测试全部展开并收集可见行的性能
pub fn benchmark_navigation(model: &JsonModel) -> PerformanceResult {
    let start = Instant::now();
    let mut state = ExpansionState::new();
    state.expand_all(model, &model.root_index());
    let rows = state.visible_rows(model);
    let duration = start.elapsed();

    PerformanceResult::new(
        "全部展开",
        duration.as_millis(),
        rows.len() == model.node_count(),
        &format!("可见 {} 行", rows.len()),
    )
}

/// 运行综合性能测试
pub fn run_performance_suite() -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    // 测试不同规模的数据
    let test_cases = [
        (3, 10),   // 小型：深度3，宽度10
        (4, 20),   // 中型：深度4，宽度20
        (5, 30),   // 大型：深度5，宽度30
    ];

    for (depth, width) in test_cases {
        tracing::info!("测试规模：深度{}，宽度{}", depth, width);

        let json_data = generate_large_json(depth, width);
        let json_str = match serde_json::to_string(&json_data) {
            Ok(s) => s,
            Err(e) => {
                results.push(PerformanceResult::new(
                    &format!("JSON序列化({}x{})", depth, width),
                    0,
                    false,
                    &e.to_string(),
                ));
                continue;
            }
        };

        results.push(benchmark_strict_parse(&json_str));

        let (model, load_result) = benchmark_lenient_load(&json_str);
        results.push(load_result);
        results.push(benchmark_navigation(&model));
    }

    // 深层嵌套
    let nested = generate_nested_arrays(1000);
    let (model, load_result) = benchmark_lenient_load(&nested);
    results.push(load_result);
    results.push(benchmark_navigation(&model));

    results
}
