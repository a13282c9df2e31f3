use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use uuid::Uuid;

#[derive(Serialize)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl Meta {
    pub fn timed(run_id: Uuid, duration_ms: u128) -> Self {
        Meta { duration_ms: Some(duration_ms), run_id: Some(run_id.to_string()) }
    }
}

pub fn print_plan<T: Serialize>(op: &str, plan: &T, meta: Option<Meta>) -> Result<()> {
    let env = json!({ "op": op, "time": Utc::now(), "apply": false, "plan": plan, "meta": meta });
    write_line(&env)
}

pub fn print_result<T: Serialize>(op: &str, result: &T, meta: Option<Meta>) -> Result<()> {
    let env = json!({ "op": op, "time": Utc::now(), "apply": true, "result": result, "meta": meta });
    write_line(&env)
}

fn write_line(env: &serde_json::Value) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, env)?;
    writeln!(&mut out)?;
    out.flush()?;
    Ok(())
}
