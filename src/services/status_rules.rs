// src/services/status_rules.rs

//! Regras puras de status: recebíveis por data de vencimento e o texto
//! de contagem regressiva usado na agenda.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::receivables::{Receivable, ReceivableStatus};

/// Janela (em dias, inclusiva) em que um recebível é "próximo do vencimento".
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 1440;

/// Dias de calendário entre hoje e o vencimento (negativo = vencido).
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// Status derivado do vencimento. `pago` nunca é revertido.
pub fn derive_receivable_status(
    current: ReceivableStatus,
    due: NaiveDate,
    today: NaiveDate,
) -> ReceivableStatus {
    if current.is_terminal() {
        return current;
    }

    match days_until(due, today) {
        diff if diff < 0 => ReceivableStatus::Vencido,
        diff if diff <= DUE_SOON_WINDOW_DAYS => ReceivableStatus::ProximoVencimento,
        _ => ReceivableStatus::Aguardando,
    }
}

/// Transição que a varredura aplica, se houver.
///
/// Mais restrita que `derive_receivable_status`: só avança
/// `aguardando`/`proximo_vencimento` e nunca volta um status.
pub fn sweep_transition(
    current: ReceivableStatus,
    due: NaiveDate,
    today: NaiveDate,
) -> Option<ReceivableStatus> {
    if !current.is_sweepable() {
        return None;
    }

    let diff = days_until(due, today);
    if diff < 0 {
        Some(ReceivableStatus::Vencido)
    } else if current == ReceivableStatus::Aguardando && diff <= DUE_SOON_WINDOW_DAYS {
        Some(ReceivableStatus::ProximoVencimento)
    } else {
        None
    }
}

/// Texto de tempo restante até `target` ("45min", "2h 10min", "Atrasado 3 dias").
pub fn compute_remaining_text(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    // Arredonda para baixo, inclusive no passado: -30s conta como 1min de atraso
    let diff_min = (target - now).num_milliseconds().div_euclid(60_000);

    if diff_min < 0 {
        let late = diff_min.abs();
        return if late < MINUTES_PER_HOUR {
            format!("Atrasado {late}min")
        } else if late < MINUTES_PER_DAY {
            format!("Atrasado {}h {}min", late / MINUTES_PER_HOUR, late % MINUTES_PER_HOUR)
        } else {
            let days = late / MINUTES_PER_DAY;
            format!("Atrasado {days} dia{}", if days > 1 { "s" } else { "" })
        };
    }

    if diff_min < MINUTES_PER_HOUR {
        format!("{diff_min}min")
    } else if diff_min < MINUTES_PER_DAY {
        format!("{}h {}min", diff_min / MINUTES_PER_HOUR, diff_min % MINUTES_PER_HOUR)
    } else {
        match diff_min / MINUTES_PER_DAY {
            1 => "1 dia".to_string(),
            days => format!("{days} dias"),
        }
    }
}

/// Rótulo do recebível na listagem ("Vence em 2 dias", "Vencido há 5 dias").
pub fn due_days_text(receivable: &Receivable, today: NaiveDate) -> String {
    let dias = receivable.effective_due_date().map(|due| days_until(due, today));

    match (receivable.status, dias) {
        (ReceivableStatus::Pago, _) => "Pago".to_string(),
        (ReceivableStatus::Aguardando, Some(d)) if d > 0 => format!("Aguardando ({d} dias)"),
        (ReceivableStatus::Aguardando, _) => "Aguardando".to_string(),
        (ReceivableStatus::ProximoVencimento, Some(d)) if d > 0 => format!("Vence em {d} dias"),
        // Vencimento hoje ou já passado, mas a varredura ainda não rodou
        (ReceivableStatus::ProximoVencimento, Some(_)) => "Vence hoje".to_string(),
        (ReceivableStatus::ProximoVencimento, None) => "Próximo do vencimento".to_string(),
        (ReceivableStatus::Vencido, Some(d)) if d < 0 => format!("Vencido há {} dias", d.abs()),
        (ReceivableStatus::Vencido, _) => "Vencido".to_string(),
    }
}
