use crate::render;
use devlog_core::date;

pub struct LogParams<'a> {
    pub project: Option<&'a str>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
    pub days: Option<u32>,
    pub json: bool,
}

pub fn execute(params: &LogParams<'_>) -> anyhow::Result<()> {
    let store = crate::open_journal()?;

    let result = match (params.days, params.from, params.to) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
            anyhow::bail!("--days cannot be combined with --from/--to")
        }
        (Some(days), None, None) => match params.project {
            None => store.get_recent(days)?,
            Some(p) => {
                if days == 0 {
                    anyhow::bail!("--days must be positive");
                }
                let from = date::days_ago(i64::from(days) - 1);
                store.get_range(Some(p), &from, &date::today())?
            }
        },
        (None, from, to) => {
            let default_from;
            let from = match from {
                Some(f) => f,
                None => {
                    default_from =
                        date::days_ago(i64::from(store.config().recent_days) - 1);
                    default_from.as_str()
                }
            };
            let default_to;
            let to = match to {
                Some(t) => t,
                None => {
                    default_to = date::today();
                    default_to.as_str()
                }
            };
            store.get_range(params.project, from, to)?
        }
    };

    if result.snapshots.is_empty() {
        println!("No snapshots in range.");
        render::print_warnings(&result.warnings);
        return Ok(());
    }

    if params.json {
        for snap in &result.snapshots {
            println!("{}", serde_json::to_string(snap)?);
        }
    } else {
        for snap in &result.snapshots {
            println!("{}", render::snapshot_line(snap));
        }
        println!("\n({} snapshots)", result.snapshots.len());
    }
    render::print_warnings(&result.warnings);
    Ok(())
}
