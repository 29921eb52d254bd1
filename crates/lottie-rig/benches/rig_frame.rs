use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kurbo::Rect;
use lottie_rig::{
    AttachmentAnimation, AttachmentConfig, AttachmentRequest, FrameGeometry, ItemId, Rig,
    RigConfig,
};
use serde_json::json;

fn pet_rig(config: RigConfig) -> Rig {
    let bytes = serde_json::to_vec(&json!({
        "fr": 60, "ip": 0, "op": 120, "w": 512, "h": 512,
        "layers": [
            { "ind": 1, "nm": "pet", "refId": "body", "ks": {
                "p": { "a": 1, "k": [{ "t": 0, "s": [256, 300] }, { "t": 60, "s": [256, 280] }, { "t": 120, "s": [256, 300] }] }
            }}
        ],
        "assets": [
            { "id": "body", "layers": [
                { "ind": 1, "nm": "torso", "ks": { "r": { "a": 1, "k": [{ "t": 0, "s": [-5] }, { "t": 120, "s": [5] }] } } },
                { "ind": 2, "nm": "neck", "parent": 1, "ks": { "p": { "a": 0, "k": [0, -80] } } },
                { "ind": 3, "nm": "head", "parent": 2, "refId": "head" },
                { "ind": 4, "nm": "back_socket", "parent": 1, "ks": { "p": { "a": 0, "k": [0, -40] } } }
            ]},
            { "id": "head", "layers": [
                { "ind": 1, "nm": "skull", "ks": { "r": { "a": 1, "k": [{ "t": 0, "s": [0] }, { "t": 30, "s": [12] }, { "t": 90, "s": [-12] }] } } },
                { "ind": 2, "nm": "hat_socket", "parent": 1, "ks": { "p": { "a": 0, "k": [0, -60] } } },
                { "ind": 3, "nm": "hair_socket", "parent": 1, "ks": { "p": { "a": 0, "k": [10, -50] } } }
            ]}
        ]
    }))
    .unwrap();
    Rig::from_slice(&bytes, config).unwrap()
}

fn bench_frame(c: &mut Criterion) {
    let items = [
        (
            ItemId::new("tophat"),
            AttachmentConfig::new("hat_socket", AttachmentAnimation::Static),
        ),
        (
            ItemId::new("braid"),
            AttachmentConfig::new(
                "hair_socket",
                AttachmentAnimation::Physics {
                    follow: 1.0,
                    damping: 0.2,
                    bias_degrees: 3.0,
                    invert: false,
                },
            ),
        ),
        (
            ItemId::new("cape"),
            AttachmentConfig::new(
                "back_socket",
                AttachmentAnimation::Floating {
                    amplitude: 4.0,
                    frequency: 1.0,
                    phase: 0.0,
                },
            ),
        ),
        (
            ItemId::new("wings"),
            AttachmentConfig::new(
                "back_socket",
                AttachmentAnimation::Pulse {
                    min_scale: 0.95,
                    max_scale: 1.05,
                    frequency: 0.5,
                },
            ),
        ),
    ];
    let geometry = FrameGeometry::new(
        Rect::new(0.0, 0.0, 512.0, 512.0),
        Rect::new(20.0, 40.0, 276.0, 296.0),
        Rect::new(0.0, 0.0, 320.0, 480.0),
    );

    for (label, cache_sockets) in [("cached", true), ("uncached", false)] {
        let mut rig = pet_rig(RigConfig {
            cache_sockets,
            ..RigConfig::default()
        });
        let mut frame = 0.0f32;
        c.bench_function(&format!("rig_frame_4_items_{label}"), |b| {
            b.iter(|| {
                frame = (frame + 1.0) % 120.0;
                let requests = items.iter().map(|(item, config)| AttachmentRequest {
                    item,
                    config,
                    mounted: true,
                });
                black_box(rig.frame(black_box(frame), &geometry, requests))
            })
        });
    }
}

criterion_group!(benches, bench_frame);
criterion_main!(benches);
