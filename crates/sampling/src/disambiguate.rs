use std::collections::HashMap;

use rowforge_config::FieldSpec;

use crate::accumulator::DiscoveredPath;

/// Suffix repeated output names with a per-name counter so every row
/// column is unique. First occurrence keeps the bare name.
pub fn disambiguate_names(paths: &mut [DiscoveredPath]) {
    let mut counters: HashMap<String, u32> = HashMap::new();
    for path in paths.iter_mut() {
        if let Some(counter) = counters.get_mut(&path.name) {
            path.name = format!("{}_{}", path.name, counter);
            *counter += 1;
        } else {
            counters.insert(path.name.clone(), 1);
        }
    }
}

/// Field specs ready to feed an extractor, one per discovered path.
pub fn to_field_specs(paths: &[DiscoveredPath]) -> Vec<FieldSpec> {
    paths
        .iter()
        .map(|p| FieldSpec::new(p.name.clone(), p.path.clone(), p.target))
        .collect()
}
