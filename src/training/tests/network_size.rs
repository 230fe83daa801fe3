use crate::nn::{NetworkKind, create_network};
use crate::training::{TrainingError, network_size, write_network_size};

#[test]
fn test_network_size_sums_every_prefix() {
    let params = vec![
        ("/block1/0/conv1/W".to_string(), vec![4, 2, 3, 3]),
        ("/block1/0/conv1/b".to_string(), vec![4]),
        ("/block1/1/norm0/gamma".to_string(), vec![4]),
        ("/output/W".to_string(), vec![10, 4]),
    ];
    let sizes = network_size(&params);

    let expected: [(String, usize); 11] = [
        ("/", 72 + 4 + 4 + 40),
        ("/block1", 80),
        ("/block1/0", 76),
        ("/block1/0/conv1", 76),
        ("/block1/0/conv1/W", 72),
        ("/block1/0/conv1/b", 4),
        ("/block1/1", 4),
        ("/block1/1/norm0", 4),
        ("/block1/1/norm0/gamma", 4),
        ("/output", 40),
        ("/output/W", 40),
    ]
    .map(|(n, s)| (n.to_string(), s));
    assert_eq!(sizes, expected);
}

#[test]
fn test_network_size_of_plan_matches_total() -> Result<(), TrainingError> {
    let plan = create_network(NetworkKind::ResNeXt, 10, &[11, 2, 2], 3)?;
    let sizes = network_size(plan.params());
    assert_eq!(sizes[0], ("/".to_string(), plan.total_size()));

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("size.txt");
    write_network_size(&path, &sizes)?;
    let content = std::fs::read_to_string(&path)?;
    assert_eq!(content.lines().next(), Some("/: 2598"));
    assert_eq!(content.lines().count(), sizes.len());
    Ok(())
}
