//! Read-only CRM directory used by the ingest stage.

use std::path::Path;

use campaign_core::error::{CampaignError, CampaignResult};
use campaign_core::types::{ChurnRisk, CustomerRecord};
use tracing::info;

/// Customers in load order. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct CustomerDirectory {
    customers: Vec<CustomerRecord>,
}

impl CustomerDirectory {
    /// Builds a directory, rejecting invalid rows and duplicate ids.
    pub fn new(customers: Vec<CustomerRecord>) -> CampaignResult<Self> {
        for (idx, customer) in customers.iter().enumerate() {
            customer.validate()?;
            if customers[..idx].iter().any(|c| c.id == customer.id) {
                return Err(CampaignError::Validation(format!(
                    "duplicate customer id {}",
                    customer.id
                )));
            }
        }
        Ok(Self { customers })
    }

    /// Loads a JSON array of customer records.
    pub fn from_json_file(path: impl AsRef<Path>) -> CampaignResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let customers: Vec<CustomerRecord> = serde_json::from_str(&raw)?;
        info!(path = %path.display(), count = customers.len(), "Loaded customer directory");
        Self::new(customers)
    }

    /// The eight-customer demo directory matching the demo social profiles.
    pub fn demo() -> Self {
        Self {
            customers: demo_customers(),
        }
    }

    pub fn find_by_name(&self, name: &str) -> CampaignResult<&CustomerRecord> {
        self.customers
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CampaignError::customer_not_found(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.customers.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomerRecord> {
        self.customers.iter()
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

fn customer(
    id: u32,
    name: &str,
    sector: &str,
    history: &str,
    spend: f64,
    risk: ChurnRisk,
) -> CustomerRecord {
    CustomerRecord {
        id,
        name: name.to_string(),
        sector: Some(sector.to_string()),
        purchase_history: Some(history.to_string()),
        average_spend: spend,
        churn_risk: risk,
    }
}

fn demo_customers() -> Vec<CustomerRecord> {
    vec![
        customer(
            1,
            "Carlos Ruiz",
            "Tecnología",
            "Laptops, Monitores",
            3200.0,
            ChurnRisk::Low,
        ),
        customer(
            2,
            "Maria Gomez",
            "Salud",
            "Suplementos, Clases de yoga",
            850.0,
            ChurnRisk::Medium,
        ),
        customer(
            3,
            "Empresa Tech SAC",
            "B2B",
            "Servidores, Licencias cloud",
            25000.0,
            ChurnRisk::Low,
        ),
        customer(
            4,
            "Juan Perez",
            "Finanzas",
            "Consultoría, Reportes premium",
            7800.0,
            ChurnRisk::High,
        ),
        customer(
            5,
            "Ana Torres",
            "Educación",
            "Cursos online, Libros",
            120.0,
            ChurnRisk::Medium,
        ),
        customer(
            6,
            "Roberto Silva",
            "Retail",
            "Terminales POS, Software de inventario",
            4300.0,
            ChurnRisk::Medium,
        ),
        customer(
            7,
            "Laura Vega",
            "Marketing",
            "Suscripción analytics, Plantillas",
            6200.0,
            ChurnRisk::Low,
        ),
        customer(
            8,
            "Pedro Morales",
            "Manufactura",
            "Sensores IoT, Mantenimiento",
            1500.0,
            ChurnRisk::Medium,
        ),
    ]
}
