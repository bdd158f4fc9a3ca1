//! Candidate type descriptors handed to discovery.
//!
//! An [`ExtensionType`] stands in for a type found in a plugin: it has a name,
//! a visibility, and a capability set saying which extension kinds it
//! implements and whether each can be constructed without arguments.
use std::fmt;
use std::sync::Arc;

use crate::extension::traits::{
    CompositeDataCooker, DataProcessor, SourceDataCooker, TableBuildAction, TableDescriptor, TableProvider,
};

pub type SourceDataCookerFactory = Arc<dyn Fn() -> Box<dyn SourceDataCooker> + Send + Sync>;
pub type CompositeDataCookerFactory = Arc<dyn Fn() -> Box<dyn CompositeDataCooker> + Send + Sync>;
pub type DataProcessorFactory = Arc<dyn Fn() -> Box<dyn DataProcessor> + Send + Sync>;

/// Whether a type implements one extension kind, and how it is constructed.
#[derive(Clone)]
pub enum Capability<F> {
    NotImplemented,
    /// Implements the kind but has no parameterless constructor.
    WithoutConstructor,
    Constructible(F),
}

impl<F> Capability<F> {
    pub fn is_implemented(&self) -> bool {
        !matches!(self, Capability::NotImplemented)
    }

    fn strip_constructor(self) -> Self {
        match self {
            Capability::Constructible(_) => Capability::WithoutConstructor,
            other => other,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Capability::NotImplemented => "no",
            Capability::WithoutConstructor => "without constructor",
            Capability::Constructible(_) => "yes",
        }
    }
}

/// Table shape carried by a type: its descriptor (if one can be extracted) and build action.
#[derive(Clone, Default)]
pub struct TableCapability {
    pub descriptor: Option<TableDescriptor>,
    pub build_action: Option<TableBuildAction>,
}

/// A candidate type produced by plugin discovery.
#[derive(Clone)]
pub struct ExtensionType {
    name: String,
    public: bool,
    source_data_cooker: Capability<SourceDataCookerFactory>,
    composite_data_cooker: Capability<CompositeDataCookerFactory>,
    data_processor: Capability<DataProcessorFactory>,
    table: Option<TableCapability>,
}

impl ExtensionType {
    /// A public type implementing no extension kind.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            public: true,
            source_data_cooker: Capability::NotImplemented,
            composite_data_cooker: Capability::NotImplemented,
            data_processor: Capability::NotImplemented,
            table: None,
        }
    }

    /// Describe a source cooker type constructed through `Default`.
    pub fn source_data_cooker<C>() -> Self
    where
        C: SourceDataCooker + Default + 'static,
    {
        Self::new(std::any::type_name::<C>())
            .with_source_data_cooker(|| Box::new(C::default()) as Box<dyn SourceDataCooker>)
    }

    /// Describe a composite cooker type constructed through `Default`.
    pub fn composite_data_cooker<C>() -> Self
    where
        C: CompositeDataCooker + Default + 'static,
    {
        Self::new(std::any::type_name::<C>())
            .with_composite_data_cooker(|| Box::new(C::default()) as Box<dyn CompositeDataCooker>)
    }

    /// Describe a data processor type constructed through `Default`.
    pub fn data_processor<P>() -> Self
    where
        P: DataProcessor + Default + 'static,
    {
        Self::new(std::any::type_name::<P>()).with_data_processor(|| Box::new(P::default()) as Box<dyn DataProcessor>)
    }

    /// Describe a table declared through [`TableProvider`].
    pub fn table<T: TableProvider>() -> Self {
        let build: TableBuildAction = Arc::new(T::build_table);
        Self::new(std::any::type_name::<T>()).with_table(Some(T::descriptor()), Some(build))
    }

    pub fn with_source_data_cooker<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn SourceDataCooker> + Send + Sync + 'static,
    {
        self.source_data_cooker = Capability::Constructible(Arc::new(factory));
        self
    }

    pub fn with_composite_data_cooker<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn CompositeDataCooker> + Send + Sync + 'static,
    {
        self.composite_data_cooker = Capability::Constructible(Arc::new(factory));
        self
    }

    pub fn with_data_processor<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn DataProcessor> + Send + Sync + 'static,
    {
        self.data_processor = Capability::Constructible(Arc::new(factory));
        self
    }

    pub fn with_table(mut self, descriptor: Option<TableDescriptor>, build_action: Option<TableBuildAction>) -> Self {
        self.table = Some(TableCapability { descriptor, build_action });
        self
    }

    /// Drop every parameterless constructor, keeping the declared capabilities.
    pub fn without_constructor(mut self) -> Self {
        self.source_data_cooker = self.source_data_cooker.strip_constructor();
        self.composite_data_cooker = self.composite_data_cooker.strip_constructor();
        self.data_processor = self.data_processor.strip_constructor();
        self
    }

    /// Mark the type as not publicly visible.
    pub fn non_public(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn source_data_cooker_capability(&self) -> &Capability<SourceDataCookerFactory> {
        &self.source_data_cooker
    }

    pub fn composite_data_cooker_capability(&self) -> &Capability<CompositeDataCookerFactory> {
        &self.composite_data_cooker
    }

    pub fn data_processor_capability(&self) -> &Capability<DataProcessorFactory> {
        &self.data_processor
    }

    pub fn table_capability(&self) -> Option<&TableCapability> {
        self.table.as_ref()
    }
}

impl fmt::Debug for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionType")
            .field("name", &self.name)
            .field("public", &self.public)
            .field("source_data_cooker", &self.source_data_cooker.describe())
            .field("composite_data_cooker", &self.composite_data_cooker.describe())
            .field("data_processor", &self.data_processor.describe())
            .field("table", &self.table.as_ref().map(|t| t.descriptor.as_ref().map(|d| d.guid)))
            .finish()
    }
}

/// Extracts table metadata from a candidate type.
///
/// Returning `None` means the type is not a table; it is never an error.
pub trait TableDescriptorFactory: Send + Sync {
    fn try_create(&self, extension_type: &ExtensionType) -> Option<(TableDescriptor, Option<TableBuildAction>)>;
}

/// Reads the table capability recorded on the type itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTableDescriptorFactory;

impl TableDescriptorFactory for DefaultTableDescriptorFactory {
    fn try_create(&self, extension_type: &ExtensionType) -> Option<(TableDescriptor, Option<TableBuildAction>)> {
        let capability = extension_type.table_capability()?;
        let descriptor = capability.descriptor.clone()?;
        Some((descriptor, capability.build_action.clone()))
    }
}
