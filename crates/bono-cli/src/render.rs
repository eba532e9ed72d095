use anyhow::Result;
use serde::Serialize;

use bono_api::registration::welcome_message;
use bono_api::status::{format_amount, status_style_class, status_text, step_text};
use bono_types::api::{AdminOverview, Dashboard, FieldError, RegisterOutcome};
use bono_types::models::{Application, User};

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Prints results either as plain text or as one JSON document per command.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn message(&self, text: &str) -> Result<()> {
        if self.json {
            return self.emit_json(&serde_json::json!({ "message": text }));
        }
        println!("{}", text);
        Ok(())
    }

    pub fn field_check(&self, error: Option<FieldError>) -> Result<()> {
        if self.json {
            return self.emit_json(&serde_json::json!({ "valid": error.is_none(), "error": error }));
        }
        match error {
            Some(e) => println!("✗ {}: {}", e.field, e.message),
            None => println!("✓ válido"),
        }
        Ok(())
    }

    pub fn registration(&self, outcome: &RegisterOutcome) -> Result<()> {
        if self.json {
            return self.emit_json(outcome);
        }
        match outcome {
            RegisterOutcome::Registered { user, .. } => {
                println!("🎉 ¡Cuenta creada exitosamente!");
                println!();
                println!("{}", welcome_message(user));
            }
            RegisterOutcome::Rejected { errors } => {
                println!("No se pudo completar el registro:");
                for e in errors {
                    println!("  {:<16} {}", e.field, e.message);
                }
            }
        }
        Ok(())
    }

    pub fn logged_in(&self, user: &User) -> Result<()> {
        if self.json {
            return self.emit_json(&serde_json::json!({
                "id": user.id,
                "username": user.username,
                "name": user.name,
                "role": user.role,
            }));
        }
        println!("Bienvenido, {}", user.name);
        Ok(())
    }

    pub fn dashboard(&self, view: &Dashboard) -> Result<()> {
        if self.json {
            return self.emit_json(view);
        }

        println!("{} ({})", view.user_name, view.role_label);
        match &view.latest {
            Some(app) => {
                println!();
                println!("Estado actual:      {}", app.status_text);
                println!("Fecha de solicitud: {}", app.submitted_at.format(DATE_FORMAT));
                println!("Documentos:         {}", step_text(app.indicators.documents));
                println!("Aprobación:         {}", step_text(app.indicators.approval));
                println!("Depósito:           {}", step_text(app.indicators.deposit));
            }
            None => println!("Sin solicitudes registradas"),
        }

        if let Some(overview) = &view.admin {
            println!();
            self.print_overview(overview);
        }
        Ok(())
    }

    pub fn admin_overview(&self, overview: &AdminOverview) -> Result<()> {
        if self.json {
            return self.emit_json(overview);
        }
        self.print_overview(overview);
        Ok(())
    }

    fn print_overview(&self, overview: &AdminOverview) {
        println!(
            "Total: {}  Pendientes: {}  Aprobadas: {}",
            overview.counts.total, overview.counts.pending, overview.counts.approved
        );
        for row in &overview.rows {
            println!();
            println!("{}  [{}]", row.applicant_name, row.status_text);
            println!("  Cédula: {}", row.cedula);
            println!("  Fecha:  {}", row.submitted_at.format(DATE_FORMAT));
            println!("  Monto:  {}", format_amount(row.amount));
            if row.actionable {
                println!("  bono admin approve {}", row.application_id);
                println!("  bono admin reject {}", row.application_id);
            }
        }
    }

    pub fn status_changed(&self, app: &Application, text: &str) -> Result<()> {
        if self.json {
            return self.emit_json(&serde_json::json!({
                "message": text,
                "application": app,
                "statusText": status_text(&app.status),
                "statusClass": status_style_class(&app.status),
            }));
        }
        println!("{}", text);
        println!("{} → {}", app.id, status_text(&app.status));
        Ok(())
    }
}
