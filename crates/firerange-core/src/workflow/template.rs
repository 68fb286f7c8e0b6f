//! The canonical workflow template.
//!
//! Every new client starts from the active template, and a reset restores
//! it. Deployments may replace the built-in list via `[[workflow.steps]]` in
//! `config.toml`.

use firerange_types::error::WorkflowError;
use firerange_types::workflow::{StepBlueprint, SubTaskBlueprint, WorkflowTemplate};

fn step(id: &str, title: &str) -> StepBlueprint {
    StepBlueprint {
        id: id.to_string(),
        title: title.to_string(),
        sub_tasks: Vec::new(),
        appointment: false,
    }
}

fn checklist(id: &str, title: &str, items: &[(&str, &str)]) -> StepBlueprint {
    StepBlueprint {
        sub_tasks: items
            .iter()
            .map(|(id, label)| SubTaskBlueprint {
                id: id.to_string(),
                label: label.to_string(),
            })
            .collect(),
        ..step(id, title)
    }
}

fn appointment(id: &str, title: &str) -> StepBlueprint {
    StepBlueprint {
        appointment: true,
        ..step(id, title)
    }
}

/// The eight steps from intake to the issued CR.
pub fn builtin_template() -> WorkflowTemplate {
    WorkflowTemplate {
        steps: vec![
            step("cadastro", "Cadastro do cliente"),
            checklist(
                "documentacao",
                "Documentação pessoal",
                &[
                    ("rg", "RG ou CNH"),
                    ("cpf", "CPF"),
                    ("comprovante_residencia", "Comprovante de residência"),
                    ("certidao_justica_federal", "Certidão da Justiça Federal"),
                    ("certidao_justica_estadual", "Certidão da Justiça Estadual"),
                    ("certidao_justica_militar", "Certidão da Justiça Militar"),
                    ("certidao_justica_eleitoral", "Certidão da Justiça Eleitoral"),
                    ("comprovante_ocupacao", "Comprovante de ocupação lícita"),
                ],
            ),
            step("filiacao", "Filiação ao clube"),
            appointment("laudo_psicologico", "Avaliação psicológica"),
            appointment("teste_tiro", "Teste de capacidade técnica"),
            step("gru", "Pagamento da GRU"),
            checklist(
                "protocolo",
                "Protocolo do requerimento no SisGCorp",
                &[
                    ("requerimento_preenchido", "Requerimento preenchido"),
                    ("documentos_anexados", "Documentos anexados"),
                    ("protocolo_enviado", "Protocolo enviado"),
                ],
            ),
            step("emissao_cr", "Emissão do Certificado de Registro"),
        ],
    }
}

/// The template in effect: the configured override when present (and
/// valid), the built-in list otherwise.
pub fn active_template(
    configured: Option<&WorkflowTemplate>,
) -> Result<WorkflowTemplate, WorkflowError> {
    match configured {
        Some(template) => {
            template
                .validate()
                .map_err(|errors| WorkflowError::InvalidTemplate(errors.join("; ")))?;
            Ok(template.clone())
        }
        None => Ok(builtin_template()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_template_shape() {
        let template = builtin_template();
        assert!(template.validate().is_ok());
        assert_eq!(template.steps.len(), 8);
        assert_eq!(template.steps[0].id, "cadastro");
        assert_eq!(template.step("documentacao").unwrap().sub_tasks.len(), 8);
        assert_eq!(template.step("protocolo").unwrap().sub_tasks.len(), 3);

        let appointments: Vec<&str> = template
            .steps
            .iter()
            .filter(|s| s.appointment)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(appointments, vec!["laudo_psicologico", "teste_tiro"]);
    }

    #[test]
    fn test_active_template_prefers_configured() {
        let custom = WorkflowTemplate {
            steps: vec![step("unico", "Único passo")],
        };
        let active = active_template(Some(&custom)).unwrap();
        assert_eq!(active.steps.len(), 1);

        assert_eq!(active_template(None).unwrap(), builtin_template());
    }

    #[test]
    fn test_active_template_rejects_invalid_override() {
        let broken = WorkflowTemplate {
            steps: vec![step("a", "A"), step("a", "B")],
        };
        let err = active_template(Some(&broken)).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTemplate(msg) if msg.contains("duplicate")));
    }
}
