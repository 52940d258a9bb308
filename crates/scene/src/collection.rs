use crate::records::DomainRecord;

/// Named, wholesale-replaceable array of domain records.
///
/// Every replacement bumps `generation`, which layer signatures use as a
/// cheap stand-in for the collection's contents.
#[derive(Debug, Clone)]
pub struct DomainCollection<T> {
    name: &'static str,
    items: Vec<T>,
    generation: u64,
}

impl<T> DomainCollection<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
            generation: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }
}

impl<T: DomainRecord> DomainCollection<T> {
    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::DomainCollection;
    use crate::records::Site;
    use foundation::bounds::LonLat;

    fn site(id: &str) -> Site {
        Site {
            id: id.to_string(),
            name: id.to_string(),
            position: LonLat::default(),
            operator: None,
        }
    }

    #[test]
    fn replace_bumps_generation() {
        let mut c: DomainCollection<Site> = DomainCollection::new("bases");
        assert_eq!(c.generation(), 0);
        c.replace(vec![site("a")]);
        c.replace(vec![site("a")]);
        assert_eq!(c.generation(), 2);
        assert_eq!(c.len(), 1);
        assert_eq!(c.name(), "bases");
    }

    #[test]
    fn find_by_id() {
        let mut c = DomainCollection::new("bases");
        c.replace(vec![site("a"), site("b")]);
        assert_eq!(c.find("b").map(|s| s.id.as_str()), Some("b"));
        assert!(c.find("z").is_none());
    }
}
