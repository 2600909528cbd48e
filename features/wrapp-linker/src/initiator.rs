use crate::{
    cancel::CancelToken,
    container::Linked,
    dependency_graph::DependencyGraph,
    errors::{InitFailure, LinkError},
    lifecycle::{Lifecycle, LifecycleState},
    registry::Registry,
    resolver::{self, Resolver},
    tags::TagParser,
};

/// Drives the registered instances from registration to a running [Linked] graph
pub(crate) struct LinkInitiator {
    registry: Registry,
    lifecycle: Lifecycle,
}
impl LinkInitiator {
    pub(crate) fn new(registry: Registry) -> LinkInitiator {
        LinkInitiator {
            lifecycle: Lifecycle::new(registry.len()),
            registry,
        }
    }

    pub async fn initiate(
        mut self,
        parser: &dyn TagParser,
        ctx: CancelToken,
    ) -> Result<Linked, LinkError> {
        tracing::debug!("Linking {} registered instances", self.registry.len());

        // Resolve and check the graph before any slot is written or hook is called
        let bindings = Resolver::new(&self.registry, parser).resolve()?;
        let graph = DependencyGraph::new(&self.registry, &bindings);
        let order = graph.walk()?;

        resolver::assign(&self.registry, bindings);
        self.lifecycle.advance_all(LifecycleState::Injected);

        self.post_construct();
        self.initialize(&order, &ctx).await?;

        tracing::info!(
            "Initialized {} instances",
            self.lifecycle.initialized().len()
        );
        Ok(Linked::new(self.registry, graph, self.lifecycle))
    }

    /// Runs every post construct hook, in registration order
    fn post_construct(&mut self) {
        for entry in self.registry.entries() {
            let Some(hook) = entry
                .component
                .as_ref()
                .and_then(|component| component.as_post_construct())
            else {
                continue;
            };

            tracing::debug!("Post constructing {}", entry.id);
            hook.post_construct();
        }

        self.lifecycle.advance_all(LifecycleState::PostConstructed);
    }

    /// Runs the init hooks in dependency order, unwinding on the first failure
    async fn initialize(&mut self, order: &[usize], ctx: &CancelToken) -> Result<(), LinkError> {
        for &index in order {
            let Err(cause) = self.initialize_one(index, ctx).await else {
                continue;
            };

            let component = self.registry.entry(index).id.clone();
            tracing::error!("Initialization of {} failed: {}", component, cause);
            self.lifecycle.set(index, LifecycleState::Shutdown);

            tracing::warn!(
                "Unwinding {} initialized instances",
                self.lifecycle.initialized().len()
            );
            self.lifecycle.shutdown_all(&self.registry);

            return Err(LinkError::InitializationFailed { component, cause });
        }

        Ok(())
    }

    async fn initialize_one(&mut self, index: usize, ctx: &CancelToken) -> Result<(), InitFailure> {
        self.lifecycle.set(index, LifecycleState::Initializing);

        let entry = self.registry.entry(index);
        if let Some(hook) = entry
            .component
            .as_ref()
            .and_then(|component| component.as_init())
        {
            ctx.check()?;

            tracing::debug!("Initializing {}", entry.id);
            hook.init(ctx.clone()).await.map_err(InitFailure::Hook)?;

            // The token may have fired while the hook ran
            ctx.check()?;
        }

        self.lifecycle.set(index, LifecycleState::Initialized);
        Ok(())
    }
}
