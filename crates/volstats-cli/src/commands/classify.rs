use volstats_core::ReplicaHealth;

pub fn run(statuses: &[String]) {
    for raw in statuses {
        let label = if raw.is_empty() { "(empty)" } else { raw.as_str() };
        println!("  {:<24} {}", label, ReplicaHealth::classify(raw));
    }
}
