//! Plain-text rendering of the dashboard views.

use std::fmt::{self, Write};

use chrono::{DateTime, FixedOffset, Utc};
use offers::{format_brl, CalculatorInput, CalculatorResult, FilteredView, Series};

const CARDS_PER_ROW: usize = 4;
const CARD_WIDTH: usize = 30;
const BAR_WIDTH: usize = 30;
const BRASILIA_OFFSET_SECS: i32 = 3 * 3600;

/// `17/10/2026 09:15 (Brasília)`
pub fn brasilia_time(at: DateTime<Utc>) -> String {
    match FixedOffset::west_opt(BRASILIA_OFFSET_SECS) {
        Some(tz) => format!("{} (Brasília)", at.with_timezone(&tz).format("%d/%m/%Y %H:%M")),
        None => format!("{} UTC", at.format("%d/%m/%Y %H:%M")),
    }
}

fn fit(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len <= width {
        format!("{}{}", s, " ".repeat(width - len))
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v}"),
        None => "-".into(),
    }
}

/// Metrics header, card grid, and sync footer.
pub fn render_offers(view: &FilteredView, synced_at: DateTime<Utc>) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let s = &view.summary;

    writeln!(out, "📈 Livelo Market Intelligence")?;
    writeln!(out)?;
    writeln!(out, "Parceiros Ativos:      {}", s.active_partners)?;
    match &s.best {
        Some(best) => {
            writeln!(
                out,
                "Maior Pontuação:       {} pts ({})",
                format_value(best.value),
                best.store
            )?;
        }
        None => {
            writeln!(out, "Maior Pontuação:       -")?;
        }
    }
    writeln!(out, "Cashback Máximo Est.:  {:.1}%", s.cashback_pct)?;
    writeln!(out)?;

    if view.records.is_empty() {
        writeln!(out, "Nenhuma oferta atende aos filtros.")?;
    }

    for row in view.records.chunks(CARDS_PER_ROW) {
        let cards: Vec<[String; 4]> = row
            .iter()
            .map(|r| {
                [
                    r.store.clone(),
                    r.points_label.clone(),
                    format!("Tipo: {}", r.offer_type),
                    r.logo_url.clone(),
                ]
            })
            .collect();

        for line in 0..4 {
            let cells: Vec<String> = cards.iter().map(|c| fit(&c[line], CARD_WIDTH)).collect();
            writeln!(out, "{}", cells.join("  ").trim_end())?;
        }
        writeln!(out, "{}", "─".repeat(CARD_WIDTH * row.len() + 2 * (row.len() - 1)))?;
    }

    writeln!(
        out,
        "{} linha(s) no histórico, {} loja(s) no snapshot, {} descartada(s)",
        s.history_rows, s.snapshot_stores, s.dropped_rows
    )?;
    writeln!(out, "Última sincronização: {}", brasilia_time(synced_at))?;
    Ok(out)
}

/// One block per store with a bar per observation.
pub fn render_history(series: &[Series]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if series.is_empty() {
        writeln!(out, "Nenhuma loja selecionada com histórico.")?;
        return Ok(out);
    }

    let max = series
        .iter()
        .flat_map(|s| s.points.iter().filter_map(|p| p.value))
        .fold(0.0_f64, f64::max);

    for s in series {
        writeln!(out, "{}", s.store)?;
        for p in &s.points {
            let bar_len = match p.value {
                Some(v) if max > 0.0 => ((v / max) * BAR_WIDTH as f64).round() as usize,
                _ => 0,
            };
            writeln!(
                out,
                "  {}  {:>6}  {}",
                p.timestamp.format("%d/%m/%Y %H:%M"),
                format_value(p.value),
                "█".repeat(bar_len)
            )?;
        }
        writeln!(out)?;
    }
    Ok(out)
}

pub fn render_calc(input: &CalculatorInput, result: &CalculatorResult) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "Compra: {} × {} pts/R$ (milheiro a {})",
        format_brl(input.purchase),
        format_value(Some(input.rate)),
        format_brl(input.sell_price)
    )?;
    writeln!(out, "Pontos ganhos:    {}", format_value(Some(result.points)))?;
    writeln!(out, "Retorno em R$:    {}", format_brl(result.cash_return))?;
    writeln!(out, "Custo líquido:    {}", format_brl(result.net_cost))?;
    writeln!(out, "Cashback efetivo: {:.1}%", result.effective_cashback_pct)?;
    Ok(out)
}
