use tenancy_orchestrator::TenantOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: TenantOrchestrator,
}

impl AppState {
    pub fn new(orchestrator: TenantOrchestrator) -> Self {
        Self { orchestrator }
    }
}
