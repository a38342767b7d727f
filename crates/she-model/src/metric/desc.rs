/// Static description of one metric family a task can emit.
///
/// Tasks publish their descriptors up front (see `Task::describe` in `she-core`),
/// so the exporter can describe every family once at registration time,
/// before any external command has run.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MetricDesc {
    /// Fully-qualified metric name (e.g. `swift_cluster_drives_unmounted`).
    pub name: &'static str,
    /// Help text rendered next to the family.
    pub help: &'static str,
    /// Ordered label names; every sample of this family carries one value per name.
    pub labels: &'static [&'static str],
}

impl MetricDesc {
    /// Declare a metric family.
    pub const fn new(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self { name, help, labels }
    }
}

