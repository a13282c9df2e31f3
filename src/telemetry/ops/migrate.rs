use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Migrate;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Select, Record, Download, Resolve, Write, Update, Report }

impl PhaseSpan for Phase {
    fn span(&self) -> Span { match self {
        Phase::Select => info_span!("select"),
        Phase::Record => info_span!("record"),
        Phase::Download => info_span!("download"),
        Phase::Resolve => info_span!("resolve"),
        Phase::Write => info_span!("write"),
        Phase::Update => info_span!("update"),
        Phase::Report => info_span!("report"),
    }}
}

impl OpMarker for Migrate {
    const NAME: &'static str = "migrate";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("migrate") }
}
