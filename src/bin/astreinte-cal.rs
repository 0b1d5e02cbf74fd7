#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use calendrier_astreinte::{
    compute_holidays,
    config::PatchRange,
    io,
    model::{ForcedDayRule, LeaveId, LeavePeriod, SubjectKind},
    scheduler::{Scheduler, YearSchedule},
    storage::{JsonStorage, Storage},
};
use chrono::{Datelike, Utc, Weekday};
use clap::{Parser, Subcommand};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Calendrier annuel d'astreinte (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON d'état (rosters, congés, pointeurs, dernier calendrier)
    #[arg(long, global = true, default_value = "astreinte.json")]
    state: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Définir les rosters (ordre de rotation)
    Roster {
        /// liste "nom1,nom2,..."
        #[arg(long)]
        technicians: Option<String>,
        /// liste "nom1,nom2,..." ; chaîne vide pour désactiver les aides
        #[arg(long)]
        helpers: Option<String>,
    },

    /// Dates où un aide est requis
    HelperDates {
        /// liste "YYYY-MM-DD,..."
        #[arg(long)]
        dates: String,
        /// filtre optionnel "Sat,Sun"
        #[arg(long)]
        weekdays: Option<String>,
    },

    /// Gérer les congés
    Leave {
        #[command(subcommand)]
        action: LeaveAction,
    },

    /// Imposer une date à un technicien pour une seule année
    ForcedDay {
        #[arg(long)]
        date: String,
        #[arg(long)]
        technician: String,
    },

    /// Lister les jours fériés d'une année
    Holidays {
        #[arg(long)]
        year: i32,
    },

    /// Générer une année complète
    Generate {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        counts_csv: Option<String>,
    },

    /// Régénérer une plage de dates du dernier calendrier
    Patch {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier le dernier calendrier
    Check {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum LeaveAction {
    Add {
        #[arg(long, default_value = "technician")]
        kind: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    Remove {
        #[arg(long)]
        id: String,
    },
    /// Importer des congés depuis un CSV
    Import {
        #[arg(long)]
        csv: String,
    },
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.state)?;
    let mut settings = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::Roster {
            technicians,
            helpers,
        } => {
            if let Some(list) = technicians {
                let names = split_list(&list);
                if names.is_empty() {
                    bail!("technician roster cannot be empty");
                }
                settings.technicians = names;
            }
            if let Some(list) = helpers {
                settings.helpers = split_list(&list);
            }
            storage.save(&settings)?;
            0
        }
        Commands::HelperDates { dates, weekdays } => {
            settings.helper_dates = split_list(&dates)
                .iter()
                .map(|d| io::parse_date(d))
                .collect::<Result<_>>()?;
            settings.helper_weekdays = match weekdays {
                Some(list) => split_list(&list)
                    .iter()
                    .map(|d| {
                        d.parse::<Weekday>()
                            .map_err(|_| anyhow::anyhow!("invalid weekday: {d}"))
                    })
                    .collect::<Result<_>>()?,
                None => Vec::new(),
            };
            storage.save(&settings)?;
            0
        }
        Commands::Leave { action } => {
            match action {
                LeaveAction::Add {
                    kind,
                    name,
                    from,
                    to,
                } => {
                    let kind: SubjectKind = kind.parse().map_err(anyhow::Error::msg)?;
                    let period =
                        LeavePeriod::new(kind, name, io::parse_date(&from)?, io::parse_date(&to)?)?;
                    let id = settings.add_leave(period)?;
                    println!("{}", id.as_str());
                }
                LeaveAction::Remove { id } => {
                    if !settings.remove_leave(&LeaveId::new(&id)) {
                        bail!("unknown leave id: {id}");
                    }
                }
                LeaveAction::Import { csv } => {
                    for period in io::import_leave_csv(csv)? {
                        settings.add_leave(period)?;
                    }
                }
                LeaveAction::List => {
                    for p in &settings.leave {
                        println!(
                            "{} | {} {} | {} → {}",
                            p.id.as_str(),
                            p.kind,
                            p.name,
                            p.start,
                            p.end
                        );
                    }
                }
            }
            storage.save(&settings)?;
            0
        }
        Commands::ForcedDay { date, technician } => {
            let date = io::parse_date(&date)?;
            settings.forced_day = Some(ForcedDayRule {
                year: date.year(),
                date,
                technician,
            });
            storage.save(&settings)?;
            0
        }
        Commands::Holidays { year } => {
            for h in compute_holidays(year)? {
                println!("{} {} {}", h.date, h.date.format("%a"), h.key);
            }
            0
        }
        Commands::Generate {
            year,
            out_json,
            out_csv,
            counts_csv,
        } => {
            let year = year.unwrap_or(settings.year);
            let scheduler = Scheduler::new(settings.plan_config(year))?;
            let schedule = scheduler
                .generate()
                .with_context(|| format!("generating year {year}"))?;

            if let Some(path) = out_json {
                io::export_schedule_json(path, &schedule)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &schedule.assignments)?;
            }
            if let Some(path) = counts_csv {
                io::export_counts_csv(path, &schedule.technician_counts)?;
            }
            print_summary(&schedule);

            settings.year = year;
            settings.record_generation(&schedule, Utc::now());
            storage.save(&settings)?;
            if schedule.warnings.is_empty() {
                0
            } else {
                2
            }
        }
        Commands::Patch { from, to, out_csv } => {
            let from = io::parse_date(&from)?;
            let to = io::parse_date(&to)?;
            let year = from.year();
            let Some(prior) = settings.cached(year).cloned() else {
                bail!("no cached calendar for {year}: run `generate --year {year}` first");
            };
            let scheduler = Scheduler::new(settings.plan_config(year))?;
            let outcome = scheduler.patch(&prior, from, to)?;

            let changed = outcome
                .published
                .days()
                .filter(|d| prior.get(d) != outcome.assignments.get(d))
                .count();
            println!(
                "Patched {} → {} ({} date(s) changed, window {} → {})",
                outcome.published.start,
                outcome.published.end,
                changed,
                outcome.window.start,
                outcome.window.end
            );
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &outcome.assignments)?;
            }

            settings.record_patch(year, &outcome, PatchRange { from, to }, Utc::now());
            storage.save(&settings)?;
            if outcome.warnings.is_empty() {
                0
            } else {
                2
            }
        }
        Commands::Check { report } => {
            let Some(cache) = settings.cache.as_ref() else {
                bail!("no cached calendar: run `generate` first");
            };
            let scheduler = Scheduler::new(settings.plan_config(cache.year))?;
            let conflicts = scheduler.audit(&cache.assignments);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["technician", "date", "other", "kind"])?;
                    for c in &conflicts {
                        let date = c.date.to_string();
                        let other = c.other.map(|d| d.to_string()).unwrap_or_default();
                        w.write_record([
                            c.technician.as_str(),
                            date.as_str(),
                            other.as_str(),
                            c.kind.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
    };

    std::process::exit(code);
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn print_summary(schedule: &YearSchedule) {
    println!(
        "Year {}: {} date(s) assigned",
        schedule.year,
        schedule.assignments.len()
    );
    for (name, count) in &schedule.technician_counts {
        println!("  {name:15} : {count:3}");
    }
    for (name, count) in &schedule.helper_counts {
        println!("  {name:15} : {count:3} (helper)");
    }
    for w in &schedule.warnings {
        eprintln!("warning: {w}");
    }
}
