//! Builds the two-sheet simulation report

use chrono::{DateTime, NaiveDate, Utc};

use super::format::{file_stem, format_currency, format_date, format_percent, round2, MISSING};
use super::workbook::{Cell, Column, Row, RowStyle, Sheet, Workbook};
use crate::domain::{Bank, Client, Property};
use crate::schedule::{AmortizationItem, SimulationOutput};
use crate::simulation::{Currency, Simulation, SimulationInput};

pub const SUMMARY_SHEET: &str = "Resumen";
pub const SCHEDULE_SHEET: &str = "Cronograma";
pub const WORKBOOK_CREATOR: &str = "Urbania360";

/// Names resolved from related entities, plus the export date
#[derive(Debug, Clone, PartialEq)]
pub struct ExportContext {
    pub client_name: Option<String>,
    pub property_title: Option<String>,
    pub bank_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub export_date: NaiveDate,
}

impl ExportContext {
    pub fn new(export_date: NaiveDate) -> Self {
        Self {
            client_name: None,
            property_title: None,
            bank_name: None,
            created_at: None,
            export_date,
        }
    }

    /// Collect display names from whatever entities are at hand, dated today
    pub fn from_entities(
        client: Option<&Client>,
        property: Option<&Property>,
        bank: Option<&Bank>,
    ) -> Self {
        Self {
            client_name: client.map(Client::display_name).filter(|name| !name.is_empty()),
            property_title: property
                .map(|p| p.title.clone())
                .filter(|title| !title.is_empty()),
            bank_name: bank.map(|b| b.name.clone()),
            created_at: None,
            export_date: Utc::now().date_naive(),
        }
    }

    pub fn with_export_date(mut self, export_date: NaiveDate) -> Self {
        self.export_date = export_date;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Build the workbook for a simulation; no I/O
pub fn build_workbook(simulation: &Simulation, ctx: &ExportContext) -> Workbook {
    let mut sheets = vec![summary_sheet(simulation, ctx)];

    if let Some(output) = &simulation.simulation_output {
        if !output.amortization_schedule.is_empty() {
            sheets.push(schedule_sheet(output));
        }
    }

    Workbook {
        creator: WORKBOOK_CREATOR.to_string(),
        file_stem: file_stem(ctx.client_name.as_deref(), ctx.export_date),
        sheets,
    }
}

fn section(sheet: &mut Sheet, title: &str) {
    sheet.add_row(Row::new(RowStyle::SectionHeader, vec![Cell::text(title)]));
}

fn data(sheet: &mut Sheet, label: &str, value: impl Into<Cell>) {
    sheet.add_row(Row::new(RowStyle::Data, vec![Cell::text(label), value.into()]));
}

fn or_missing(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

/// Rates entered as zero display as missing
fn nonzero(rate: Option<f64>) -> Option<f64> {
    rate.filter(|r| *r != 0.0)
}

fn summary_sheet(simulation: &Simulation, ctx: &ExportContext) -> Sheet {
    let input = &simulation.simulation_input;
    let currency = input.currency;

    let mut sheet = Sheet::new(
        SUMMARY_SHEET,
        vec![
            Column { header: None, key: "label", width: 35 },
            Column { header: None, key: "value", width: 25 },
        ],
    );

    sheet.add_row(Row::new(
        RowStyle::Title,
        vec![Cell::text("RESUMEN DE SIMULACIÓN HIPOTECARIA")],
    ));
    sheet.add_blank();

    section(&mut sheet, "Información General");
    data(&mut sheet, "Cliente", or_missing(ctx.client_name.as_deref()));
    data(&mut sheet, "Propiedad", or_missing(ctx.property_title.as_deref()));
    data(
        &mut sheet,
        "Banco",
        ctx.bank_name.clone().unwrap_or_else(|| "Tasa manual".to_string()),
    );
    let created = ctx.created_at.or(simulation.created_at);
    data(&mut sheet, "Fecha de Creación", format_date(created.map(|c| c.date_naive())));
    sheet.add_blank();

    loan_section(&mut sheet, input);
    sheet.add_blank();

    section(&mut sheet, "Período de Gracia");
    data(&mut sheet, "Tipo de Gracia", input.grace_type.display_name());
    data(&mut sheet, "Meses de Gracia", Cell::Integer(i64::from(input.grace_months)));
    sheet.add_blank();

    section(&mut sheet, "Bono MiVivienda");
    let bonus = input.apply_mi_vivienda_bonus;
    data(&mut sheet, "Aplica Bono", if bonus { "Sí" } else { "No" });
    data(
        &mut sheet,
        "Monto del Bono",
        if bonus {
            format_currency(Some(input.bonus_amount), currency)
        } else {
            MISSING.to_string()
        },
    );
    sheet.add_blank();

    section(&mut sheet, "Seguros y Comisiones");
    data(
        &mut sheet,
        "Seguro Desgravamen (mensual)",
        format_percent(Some(input.life_insurance_rate_monthly)),
    );
    data(
        &mut sheet,
        "Seguro Inmueble (anual)",
        format_percent(Some(input.risk_insurance_rate_annual)),
    );
    data(
        &mut sheet,
        "Comisiones Mensuales",
        format_currency(Some(input.fees_monthly), currency),
    );
    sheet.add_blank();

    results_section(&mut sheet, simulation.simulation_output.as_ref(), currency);
    sheet
}

fn loan_section(sheet: &mut Sheet, input: &SimulationInput) {
    section(sheet, "Datos del Crédito");
    data(sheet, "Monto Principal", format_currency(Some(input.principal), input.currency));
    data(sheet, "Moneda", input.currency.display_name());
    data(sheet, "Tipo de Tasa", input.rate_type.label());
    data(sheet, "TEA", format_percent(nonzero(input.tea)));
    data(sheet, "TNA", format_percent(nonzero(input.tna)));
    data(
        sheet,
        "Capitalización/Año",
        match input.capitalization_per_year {
            Some(k) if k > 0 => Cell::Integer(i64::from(k)),
            _ => Cell::text(MISSING),
        },
    );
    data(sheet, "Plazo (meses)", Cell::Integer(i64::from(input.term_months)));
    data(sheet, "Fecha de Inicio", format_date(input.start_date));
}

fn results_section(sheet: &mut Sheet, output: Option<&SimulationOutput>, currency: Currency) {
    section(sheet, "Resultados");

    let money = |value: Option<f64>| format_currency(value, currency);
    data(sheet, "TEM (Tasa Efectiva Mensual)", format_percent(output.map(|o| o.tem)));
    data(sheet, "Cuota Mensual", money(output.map(|o| o.monthly_payment)));
    data(sheet, "TCEA", format_percent(output.and_then(|o| o.tcea)));
    data(sheet, "VAN", money(output.map(|o| o.van)));
    data(sheet, "TIR", format_percent(output.and_then(|o| o.tir)));
    data(sheet, "Intereses Totales", money(output.map(|o| o.total_interest)));
    data(sheet, "Costo Total", money(output.map(|o| o.total_cost)));
}

fn schedule_columns() -> Vec<Column> {
    [
        ("Período", "period", 10),
        ("Fecha Vencimiento", "dueDate", 16),
        ("Saldo Inicial", "openingBalance", 15),
        ("Interés", "interest", 12),
        ("Amortización", "principal", 14),
        ("Cuota", "installment", 12),
        ("Seguro Desgravamen", "lifeInsurance", 17),
        ("Seguro Inmueble", "riskInsurance", 15),
        ("Comisiones", "fees", 12),
        ("Saldo Final", "closingBalance", 15),
    ]
    .into_iter()
    .map(|(header, key, width)| Column {
        header: Some(header.to_string()),
        key,
        width,
    })
    .collect()
}

fn schedule_row(item: &AmortizationItem) -> Row {
    Row::new(
        RowStyle::Data,
        vec![
            Cell::Integer(i64::from(item.period)),
            Cell::Text(format_date(item.due_date)),
            Cell::Number(round2(item.opening_balance)),
            Cell::Number(round2(item.interest)),
            Cell::Number(round2(item.principal)),
            Cell::Number(round2(item.installment)),
            Cell::Number(round2(item.life_insurance)),
            Cell::Number(round2(item.risk_insurance)),
            Cell::Number(round2(item.fees)),
            Cell::Number(round2(item.closing_balance)),
        ],
    )
}

fn schedule_sheet(output: &SimulationOutput) -> Sheet {
    let columns = schedule_columns();
    let header = columns
        .iter()
        .map(|c| Cell::text(c.header.as_deref().unwrap_or_default()))
        .collect();

    let mut sheet = Sheet::new(SCHEDULE_SHEET, columns);
    sheet.add_row(Row::new(RowStyle::Header, header));

    for item in &output.amortization_schedule {
        sheet.add_row(schedule_row(item));
    }

    let totals = output.schedule_totals();
    sheet.add_blank();
    sheet.add_row(Row::new(
        RowStyle::Totals,
        vec![
            Cell::text("TOTALES"),
            Cell::Empty,
            Cell::Empty,
            Cell::Number(round2(totals.interest)),
            Cell::Number(round2(totals.principal)),
            Cell::Number(round2(totals.installment)),
            Cell::Number(round2(totals.life_insurance)),
            Cell::Number(round2(totals.risk_insurance)),
            Cell::Number(round2(totals.fees)),
            Cell::Empty,
        ],
    ));
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::AmortizationEngine;
    use crate::simulation::{GraceType, RateType};

    fn computed(input: SimulationInput) -> Simulation {
        let output = AmortizationEngine::default().simulate(&input).unwrap();
        Simulation::new("c-1", input).with_output(output)
    }

    fn ctx() -> ExportContext {
        let mut ctx = ExportContext::new(NaiveDate::from_ymd_opt(2025, 8, 20).unwrap());
        ctx.client_name = Some("María Torres".to_string());
        ctx
    }

    #[test]
    fn test_summary_values() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12)
            .with_grace(GraceType::Partial, 2)
            .with_fees(10.0);
        let workbook = build_workbook(&computed(input), &ctx());

        assert_eq!(workbook.file_stem, "Simulacion_Mar_a_Torres_2025-08-20");
        let summary = workbook.sheet(SUMMARY_SHEET).unwrap();
        assert_eq!(summary.lookup("Cliente"), Some(&Cell::text("María Torres")));
        assert_eq!(summary.lookup("Propiedad"), Some(&Cell::text("-")));
        assert_eq!(summary.lookup("Banco"), Some(&Cell::text("Tasa manual")));
        assert_eq!(summary.lookup("TEA"), Some(&Cell::text("12.0000%")));
        assert_eq!(summary.lookup("TNA"), Some(&Cell::text("-")));
        assert_eq!(summary.lookup("Tipo de Gracia"), Some(&Cell::text("Parcial")));
        assert_eq!(summary.lookup("Meses de Gracia"), Some(&Cell::Integer(2)));
        assert_eq!(summary.lookup("Aplica Bono"), Some(&Cell::text("No")));
        assert_eq!(summary.lookup("Comisiones Mensuales"), Some(&Cell::text("S/ 10.00")));
        assert_eq!(summary.rows_styled(RowStyle::SectionHeader).count(), 6);
    }

    #[test]
    fn test_schedule_sheet() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12)
            .with_start_date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        let workbook = build_workbook(&computed(input), &ctx());

        let sheet = workbook.sheet(SCHEDULE_SHEET).unwrap();
        assert_eq!(sheet.columns.len(), 10);
        assert_eq!(sheet.rows_styled(RowStyle::Data).count(), 12);
        // Header, 12 periods, blank, totals
        assert_eq!(sheet.rows.len(), 15);

        let first = &sheet.rows[1];
        assert_eq!(first.cells[0], Cell::Integer(1));
        assert_eq!(first.cells[1], Cell::text("28/2/2025"));
        assert_eq!(first.cells[5], Cell::Number(8856.21));

        let totals = sheet.rows.last().unwrap();
        assert_eq!(totals.style, RowStyle::Totals);
        assert_eq!(totals.cells[0], Cell::text("TOTALES"));
        assert_eq!(totals.cells[4], Cell::Number(100_000.0));
    }

    #[test]
    fn test_uncomputed_simulation() {
        let input = SimulationInput::new(50_000.0, RateType::Tna, 0.1, 24);
        let workbook = build_workbook(&Simulation::new("c-2", input), &ctx());

        assert_eq!(workbook.sheets.len(), 1);
        let summary = workbook.sheet(SUMMARY_SHEET).unwrap();
        assert_eq!(summary.lookup("TCEA"), Some(&Cell::text("-")));
        assert_eq!(summary.lookup("Cuota Mensual"), Some(&Cell::text("-")));
        assert_eq!(summary.lookup("TNA"), Some(&Cell::text("10.0000%")));
        assert_eq!(summary.lookup("Tipo de Tasa"), Some(&Cell::text("TNA")));
    }

    #[test]
    fn test_context_from_entities() {
        let client: Client =
            serde_json::from_str(r#"{"id": "c", "firstName": "Ana", "lastName": "Vega"}"#).unwrap();
        let ctx = ExportContext::from_entities(Some(&client), None, None);
        assert_eq!(ctx.client_name.as_deref(), Some("Ana Vega"));
        assert!(ctx.property_title.is_none());
        assert!(ctx.bank_name.is_none());
    }
}
