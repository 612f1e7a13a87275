/// Container state as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Exited,
    /// The engine has no record of the container id.
    Unknown,
}

/// Everything the engine needs to create a container.
#[derive(Debug, Clone)]
pub struct ContainerSpec<'a> {
    pub name: &'a str,
    pub image: &'a str,
    /// Service containers listen on the network; the engine publishes
    /// their exposed ports on ephemeral host ports.
    pub publish_all_ports: bool,
}

/// Handle to a started service container. Carries what a caller needs to
/// stop it later; it is stale once the container has been stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContainer {
    pub container_id: String,
    pub container_name: String,
    pub image: String,
}
