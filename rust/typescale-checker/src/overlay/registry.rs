use crate::host::OverlayHost;

/// Who asked for a synthetic id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOwner {
    /// Links in the on-page overlay
    Overlay,
    /// Entries of the last report sent to the panel
    Report,
}

#[derive(Debug, Clone)]
struct Generated<E> {
    element: E,
    id: String,
    owners: Vec<IdOwner>,
}

/// Synthetic element ids handed out for deep links into the page.
///
/// Elements that already carry an id keep it and are not tracked. Every id
/// this registry writes is recorded together with the owners still using it,
/// and is stripped again once the last of them lets go.
#[derive(Debug, Clone)]
pub struct IdRegistry<E> {
    prefix: String,
    generated: Vec<Generated<E>>,
}

impl<E: Clone + PartialEq> IdRegistry<E> {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            generated: Vec::new(),
        }
    }

    /// The id of `element`, assigning a fresh synthetic one if it has none.
    pub fn assign<H: OverlayHost<Element = E>>(
        &mut self,
        host: &mut H,
        element: &E,
        owner: IdOwner,
    ) -> String {
        if let Some(entry) = self
            .generated
            .iter_mut()
            .find(|entry| entry.element == *element)
        {
            if !entry.owners.contains(&owner) {
                entry.owners.push(owner);
            }
            return entry.id.clone();
        }
        if let Some(id) = host.attribute(element, "id").filter(|id| !id.is_empty()) {
            return id;
        }

        let id = loop {
            let candidate = format!("{}-{:08x}", self.prefix, rand::random::<u32>());
            // Random ids can collide; skip any already present in the page or
            // handed out earlier.
            if host.element_by_id(&candidate).is_none() && !self.contains(&candidate) {
                break candidate;
            }
        };

        host.set_attribute(element, "id", &id);
        self.generated.push(Generated {
            element: element.clone(),
            id: id.clone(),
            owners: vec![owner],
        });
        id
    }

    /// Whether `id` was generated by this registry and not yet stripped.
    pub fn contains(&self, id: &str) -> bool {
        self.generated.iter().any(|entry| entry.id == id)
    }

    /// How many generated ids `owner` still holds.
    pub fn held_by(&self, owner: IdOwner) -> usize {
        self.generated
            .iter()
            .filter(|entry| entry.owners.contains(&owner))
            .count()
    }

    pub fn len(&self) -> usize {
        self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }

    /// Drop `owner`'s hold on its ids, stripping those nobody holds any more.
    pub fn release<H: OverlayHost<Element = E>>(&mut self, host: &mut H, owner: IdOwner) {
        self.generated.retain_mut(|entry| {
            entry.owners.retain(|held| *held != owner);
            if entry.owners.is_empty() {
                strip(host, entry);
                false
            } else {
                true
            }
        });
    }

    /// Strip every generated id that is still in place.
    pub fn clear<H: OverlayHost<Element = E>>(&mut self, host: &mut H) {
        for entry in self.generated.drain(..) {
            strip(host, &entry);
        }
    }
}

fn strip<H: OverlayHost>(host: &mut H, entry: &Generated<H::Element>) {
    if host.attribute(&entry.element, "id").as_deref() == Some(entry.id.as_str()) {
        host.remove_attribute(&entry.element, "id");
    }
}
