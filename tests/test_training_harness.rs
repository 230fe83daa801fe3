/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 训练周边组件集成测试
 *                 验证：JSON 配置 → 网络参数布局与大小统计、CIFAR-10 二进制数据加载与增强、
 *                 子批次梯度累积 + 动量SGD（含权重衰减）、学习率调度、LogReport/PrintReport 日志、Bestshot 快照
 *
 * 用一个分组卷积 stem 和 0.5*mean(y²) 作为损失，在临时目录下构造的小型 CIFAR-10 上跑3个 epoch
 */

use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::Value;

use shake_torch::checkpoint::{load_npz, save_params};
use shake_torch::config::{Learning, TrainConfig};
use shake_torch::data::load_dataset;
use shake_torch::nn::GroupedConv2d;
use shake_torch::ops::pair;
use shake_torch::training::{
    Bestshot, LogReport, Observation, PrintReport, Schedule, TrainingState, average_grads,
    network_size, sub_batch_ranges, write_network_size,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

const PIXELS: usize = 3 * 32 * 32;

/// 每个训练文件2张图，测试文件2张图
fn write_cifar10(root: &Path) -> std::io::Result<()> {
    let dir = root.join("cifar-10-batches-bin");
    fs::create_dir_all(&dir)?;
    let record = |label: u8| {
        let mut bytes = vec![label];
        bytes.extend((0..PIXELS).map(|i| (i as u8).wrapping_mul(label.wrapping_add(1))));
        bytes
    };
    for i in 1..=5u8 {
        fs::write(
            dir.join(format!("data_batch_{i}.bin")),
            [record(i), record(i + 5)].concat(),
        )?;
    }
    fs::write(dir.join("test_batch.bin"), [record(0), record(1)].concat())
}

#[test]
fn test_config_plan_and_network_size() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"dataset": "cifar10", "network": "resnext", "params": [11, 2, 2], "learning": "cosine"}"#,
    )?;

    let config = TrainConfig::from_json_file(&config_path)?;
    assert_eq!(config.learning, Learning::Cosine);
    let out_dir = config.result_dir(dir.path());
    assert!(out_dir.ends_with("cifar10-resnext-11-2-2-cosine"));
    fs::create_dir_all(&out_dir)?;

    let plan = config.create_plan()?;
    let sizes = network_size(plan.params());
    write_network_size(out_dir.join("network_size.txt"), &sizes)?;

    let text = fs::read_to_string(out_dir.join("network_size.txt"))?;
    assert_eq!(text.lines().next(), Some("/: 2598"));
    assert_eq!(text.lines().count(), sizes.len());
    assert!(text.lines().any(|line| line == "/block1/0/conv2/W: 72"));
    println!("网络参数总数: {}", plan.total_size());
    Ok(())
}

#[test]
fn test_train_loop_with_reports_and_bestshot() -> TestResult {
    let root = tempfile::tempdir()?;
    write_cifar10(root.path())?;

    let mut config = TrainConfig::new("cifar10", "resnext", &[11, 2, 2]);
    config.epoch = 3;
    config.batchsize = 4;
    config.procsize = Some(2);
    config.rate = 0.01;
    config.seed = Some(0);
    config.validate()?;

    let out_dir = config.result_dir(root.path().join("result"));
    let (train, test) = load_dataset(&config.dataset, root.path())?;
    assert_eq!((train.len(), test.len()), (10, 2));
    assert_eq!(train.image_shape(), vec![3, 32, 32]);

    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or_default());
    let mut stem = GroupedConv2d::new(None, 6, 3, pair(3), pair(1), pair(1), false, config.seed)?;
    let schedule = config.schedule();
    let mut optimizer = config.optimizer();

    let mut log_report = LogReport::default();
    let mut print_report = PrintReport::new(&["epoch", "iteration", "main/loss", "lr"], Vec::new());
    let mut bestshot = Bestshot::default();
    let accuracies = [0.5, 0.4, 0.7];
    let mut saved = Vec::new();

    let iterations_per_epoch = train.len() / config.batchsize;
    let mut state = TrainingState::default();
    for epoch in 0..config.epoch {
        let lr = schedule.value(epoch);
        optimizer.set_learning_rate(lr as f32);
        let mut order = (0..train.len()).collect::<Vec<_>>();
        order.shuffle(&mut rng);

        for batch in order.chunks_exact(config.batchsize) {
            let (images, _labels) = train.get_batch(batch, &mut rng)?;
            assert_eq!(images.shape(), &[4, 3, 32, 32]);

            stem.cleargrads();
            let ranges = sub_batch_ranges(batch.len(), config.procsize());
            let mut loss = 0.0;
            for range in &ranges {
                let xs = images.narrow(0, range.start, range.len())?;
                let y = stem.forward(&xs)?;
                let count = y.size() as f32;
                loss += f64::from(y.map(|v| v * v).sum() / (2.0 * count));
                stem.backward(&xs, &(&y / count))?;
            }
            average_grads(stem.params_mut(), ranges.len());
            let before = stem.params()[0].data().cloned();
            optimizer.update(&mut stem.params_mut());
            assert_ne!(stem.params()[0].data().cloned(), before);

            state.iteration += 1;
            state.epoch_detail = state.iteration as f64 / iterations_per_epoch as f64;
            state.epoch = state.iteration / iterations_per_epoch;
            state.elapsed_time = state.iteration as f64 * 0.1;

            let mut observation = Observation::new();
            observation.insert("main/loss".to_string(), loss / ranges.len() as f64);
            observation.insert("lr".to_string(), lr);
            if state.iteration % iterations_per_epoch == 0 {
                observation.insert("validation/main/accuracy".to_string(), accuracies[epoch]);
            }

            if log_report.observe(&state, &observation, &out_dir)? {
                print_report.update(log_report.log())?;
            }
            let snapshot = bestshot.observe(&state, &observation, &out_dir, |path| {
                save_params(path, "/stem", &stem.params())
            })?;
            saved.extend(snapshot.map(|_| state.epoch));
        }
    }

    // 只有第1、3个 epoch 刷新了最好成绩
    assert_eq!(saved, vec![1, 3]);
    assert_eq!(bestshot.best(), Some(0.7));
    let snapshot = load_npz(out_dir.join("bestshot.npz"))?;
    assert_eq!(
        snapshot.keys().collect::<Vec<_>>(),
        ["stem/W", "stem/b"]
    );
    assert_eq!(snapshot["stem/W"].shape(), &[3, 2, 1, 3, 3]);
    assert!(!out_dir.join("tmpbestshot.npz").exists());

    let log: Vec<Value> = serde_json::from_str(&fs::read_to_string(out_dir.join("log"))?)?;
    assert_eq!(log.len(), 3);
    assert_eq!(log[2]["epoch"], 3);
    assert_eq!(log[2]["iteration"], 6);
    assert_eq!(log.len(), log_report.log().len());

    let printed = String::from_utf8(print_report.into_inner())?;
    let lines = printed.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("epoch       iteration   main/loss   lr"));
    println!("{printed}");
    Ok(())
}
