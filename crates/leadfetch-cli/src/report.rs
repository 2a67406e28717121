use leadfetch_core::LeadStage;
use leadfetch_db::{list_leads, list_leads_by_stage, LeadRow};

/// Print a table of stored leads, optionally filtered by lifecycle stage.
///
/// # Errors
///
/// Returns an error if the stage filter does not parse or the database query
/// fails.
pub(crate) async fn run_report(
    pool: &sqlx::PgPool,
    stage_filter: Option<&str>,
) -> anyhow::Result<()> {
    let leads = match stage_filter {
        Some(raw) => {
            let stage: LeadStage = raw
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown stage '{raw}'"))?;
            list_leads_by_stage(pool, stage).await?
        }
        None => list_leads(pool).await?,
    };

    if leads.is_empty() {
        println!(
            "no leads found{}; run `ingest` first",
            stage_filter
                .map(|s| format!(" at stage {s}"))
                .unwrap_or_default()
        );
        return Ok(());
    }

    let header = format!(
        "{:<7}{:<26}{:<11}{:<12}{:<11}EMAIL",
        "ID", "PROFILE", "FANS", "STAGE", "PLATFORM"
    );
    println!("{header}");
    for lead in &leads {
        println!("{}", format_lead_row(lead));
    }
    println!();
    println!("{} leads total", leads.len());

    Ok(())
}

fn format_lead_row(lead: &LeadRow) -> String {
    let fans = lead
        .fans
        .map_or_else(|| "\u{2014}".to_string(), |f| f.to_string());
    let profile_display = if lead.profile_name.chars().count() > 24 {
        format!("{}...", lead.profile_name.chars().take(21).collect::<String>())
    } else {
        lead.profile_name.clone()
    };
    format!(
        "{:<7}{:<26}{:<11}{:<12}{:<11}{}",
        lead.id,
        profile_display,
        fans,
        lead.lead_stage,
        lead.platform,
        lead.email.as_deref().unwrap_or("\u{2014}")
    )
}
