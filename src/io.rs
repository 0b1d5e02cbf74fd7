use crate::model::{AssignmentMap, Counters, LeavePeriod, SubjectKind};
use crate::scheduler::YearSchedule;
use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Date au format `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date (expected YYYY-MM-DD): {raw}"))
}

/// Import de congés depuis CSV: header `kind,name,start,end` (`kind` vide = technician)
pub fn import_leave_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<LeavePeriod>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let kind: SubjectKind = rec
            .get(0)
            .unwrap_or("")
            .parse()
            .map_err(anyhow::Error::msg)?;
        let name = rec.get(1).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid leave row (empty name)");
        }
        let start = parse_date(rec.get(2).context("missing start")?)?;
        let end = parse_date(rec.get(3).context("missing end")?)?;
        let period = LeavePeriod::new(kind, name, start, end)
            .with_context(|| format!("invalid leave period for {name}"))?;
        out.push(period);
    }
    Ok(out)
}

/// Export CSV des affectations: header `date,weekday,technician,day_type,helper`
pub fn export_assignments_csv<P: AsRef<Path>>(
    path: P,
    assignments: &AssignmentMap,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "weekday", "technician", "day_type", "helper"])?;
    for (date, a) in assignments {
        let day = date.format("%Y-%m-%d").to_string();
        let weekday = date.weekday().to_string();
        w.write_record([
            day.as_str(),
            weekday.as_str(),
            a.technician.as_str(),
            a.day_type.as_str(),
            a.helper.as_deref().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des compteurs: header `name,count`
pub fn export_counts_csv<P: AsRef<Path>>(path: P, counts: &Counters) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["name", "count"])?;
    let mut buf = itoa::Buffer::new();
    for (name, count) in counts {
        w.write_record([name.as_str(), buf.format(*count)])?;
    }
    w.flush()?;
    Ok(())
}

/// Export JSON d'une année générée (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(path: P, schedule: &YearSchedule) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}
