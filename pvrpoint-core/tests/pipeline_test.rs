// End-to-end tests for the point pipeline
mod common;

use common::*;
use pvrpoint_core::config::{DepthSource, PipelineConfig};
use pvrpoint_core::error::PointError;
use pvrpoint_core::hw::*;
use pvrpoint_core::params::{ParamBuffers, SoftParamBuffers};
use pvrpoint_core::point::isp::{NativeFloat, PackedFixed};
use pvrpoint_core::point::pipeline::{DrawInput, DrawReport, PointPipeline};
use pvrpoint_core::point::{Lighting, PointContext, Vertex, ZCompare};
use pvrpoint_core::region::{RegionBounds, RegionDescriptor};

#[test]
fn flat_points_with_ample_space() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let verts = row(3);

    let report = draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(
        report,
        DrawReport { requested: 3, admitted: 3, consumed: 3, emitted: 3, exhausted: false }
    );
    assert_eq!(bufs.isp().pos(), 3 * 5 * 4);
    assert_eq!(bufs.tsp().words(), &[0x01, 0x0101_0000, 0x02, 0x0202_0000, 0x03, 0x0303_0000]);
    assert_eq!(bufs.region_objects().len(), 3);

    // Each ISP record carries the halved TSP address of its own record.
    for i in 0..3 {
        assert_eq!(bufs.isp().words()[i * 20 + 3], PCX2_FORW_VISIB_FP | ((i as u32) << 4));
    }
}

#[test]
fn textured_highlight_light_volume_with_room_for_one() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 10);
    let ctx = PointContext {
        texture: true,
        highlight: true,
        lighting: Lighting::LightVolume { color: 0x00FF_0000 },
        fog: true,
        texture_name: 0x0012_0034,
        ..PointContext::default()
    };
    let verts = row(2);

    let report = draw(&mut p, &ctx, &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(report.emitted, 1);
    assert_eq!(report.consumed, 1);
    assert!(report.exhausted);
    assert_eq!(bufs.isp().pos(), 20);
    assert_eq!(bufs.tsp().pos(), 10);
    assert_eq!(bufs.region_objects().len(), 1);

    let tsp = bufs.tsp().words();
    let flags = MASK_SHADOW_FLAG | MASK_FLAT_HIGHLIGHT | MASK_TEXTURE | MASK_DISABLE_FOG | MASK_GOURAUD;
    assert_eq!(tsp[0] & flags, MASK_SHADOW_FLAG | MASK_FLAT_HIGHLIGHT | MASK_TEXTURE);
    assert_eq!(tsp[0] & 0xFF, 0x01);
    assert_eq!(tsp[1], 0x0101_0000 | 0x1F);
    assert_eq!(tsp[4] & 0xFFFF_0000, 0x0034_0000);
    assert_eq!(tsp[6] & 0xFFFF_0000, 0x0012_0000);
}

#[test]
fn isp_admission_truncates_request() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(50, 1000);
    let verts = row(5);

    let report = draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(report.admitted, 2);
    assert_eq!(report.emitted, 2);
    assert_eq!(report.consumed, 2);
    assert!(!report.exhausted);
    assert_eq!(bufs.isp().pos(), 2 * 20);
    assert_eq!(bufs.tsp().pos(), 2 * 2);
}

#[test]
fn tsp_shortfall_limits_isp_too() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 6);
    let verts = row(5);

    let report = draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(report.admitted, 5);
    assert_eq!(report.emitted, 3);
    assert_eq!(report.consumed, 3);
    assert!(report.exhausted);
    assert_eq!(bufs.isp().pos(), 3 * 20);
    assert_eq!(bufs.tsp().pos(), 6);
}

#[test]
fn no_isp_space_is_an_error_without_side_effects() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(10, 100);
    bufs.tsp_mut().set_pos(1);
    let verts = row(1);

    let err = draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap_err();

    assert_eq!(err, PointError::IspExhausted { requested: 1, available_words: 10 });
    assert_eq!(bufs.isp().pos(), 0);
    assert_eq!(bufs.tsp().pos(), 1);
    assert!(bufs.region_objects().is_empty());

    let mut full = SoftParamBuffers::new(40, 100);
    full.isp_mut().set_pos(40);
    let err = draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut full).unwrap_err();
    assert_eq!(err, PointError::IspExhausted { requested: 1, available_words: 0 });
}

#[test]
fn packed_fixed_profile_layout() {
    let mut p = pipeline::<PackedFixed>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let verts = row(3);

    let report = draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(report.emitted, 3);
    assert_eq!(bufs.isp().pos(), 3 * 5 * 3);
    let isp = bufs.isp().words();
    for i in 0..3 {
        let rec = &isp[i * 15..(i + 1) * 15];
        assert_eq!(rec[0] & 0xFC00_0000, PCX1_FORW_VISIB_FP);
        assert_eq!(rec[1], (i as u32) << 20);
        // (1 - 0.5) in 1.31 fixed point
        assert_eq!(rec[2], 0x4000_0000);
        assert_eq!(rec[3] & 0x000F_FFFF, 0x000E_4000);
    }
}

#[test]
fn clipping_rejects_points_outside_any_bound() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let ctx = PointContext {
        clipping: true,
        regions: RegionBounds { first_x: 1, first_y: 0, last_x: 2, last_y: 0 },
        ..flat_context()
    };
    let verts = [
        vertex(10.0, 5.0, 0x11),
        vertex(40.0, 5.0, 0x22),
        vertex(100.0, 5.0, 0x33),
        vertex(40.0, 40.0, 0x44),
    ];

    let report = draw(&mut p, &ctx, &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(report.emitted, 1);
    assert_eq!(report.consumed, 4);
    assert_eq!(bufs.tsp().words(), &[0, 0x0022_0000]);
    let region = RegionDescriptor(bufs.region_objects()[0].region);
    assert_eq!((region.first_x(), region.last_x()), (1, 1));
    assert_eq!((region.first_y(), region.last_y()), (0, 0));
}

#[test]
fn clipping_clamps_straddling_points() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let ctx = PointContext {
        clipping: true,
        line_width: 8,
        regions: RegionBounds { first_x: 1, first_y: 0, last_x: 2, last_y: 0 },
        ..flat_context()
    };
    let verts = [vertex(28.0, 5.0, 0x11), vertex(60.0, 28.0, 0x22)];

    let report = draw(&mut p, &ctx, &DrawInput::direct(&verts), &mut bufs).unwrap();
    assert_eq!(report.emitted, 2);

    let first = RegionDescriptor(bufs.region_objects()[0].region);
    assert_eq!((first.first_x(), first.last_x()), (1, 1));
    assert_eq!((first.first_y(), first.last_y()), (0, 0));

    // 28..35 lines crosses into region row 1; clamped back to line 31.
    let second = RegionDescriptor(bufs.region_objects()[1].region);
    assert_eq!((second.first_x(), second.last_x()), (1, 2));
    assert_eq!((second.first_y(), second.last_y()), (0, 0));
}

#[test]
fn unclipped_extent_spans_regions() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let ctx = PointContext { line_width: 8, ..flat_context() };
    let verts = [vertex(60.0, 28.0, 0x22)];

    draw(&mut p, &ctx, &DrawInput::direct(&verts), &mut bufs).unwrap();

    let region = RegionDescriptor(bufs.region_objects()[0].region);
    assert_eq!((region.first_x(), region.last_x()), (1, 2));
    assert_eq!((region.first_y(), region.last_y()), (0, 1));
}

#[test]
fn indexed_points_follow_index_order() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let verts = row(3);
    let indices = [2u16, 0, 2];

    let report = draw(&mut p, &flat_context(), &DrawInput::indexed(&verts, &indices), &mut bufs).unwrap();

    assert_eq!(report.emitted, 3);
    let colors: Vec<u32> = bufs.tsp().words().chunks(2).map(|r| r[0] & 0xFF).collect();
    assert_eq!(colors, [3, 1, 3]);
}

#[test]
fn malformed_input_is_rejected_up_front() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let verts = row(3);

    let bad_index = [0u16, 5];
    let err = draw(&mut p, &flat_context(), &DrawInput::indexed(&verts, &bad_index), &mut bufs).unwrap_err();
    assert!(matches!(err, PointError::InvalidInput { .. }));

    let err = draw(&mut p, &flat_context(), &DrawInput::direct(&verts).with_count(4), &mut bufs).unwrap_err();
    assert!(matches!(err, PointError::InvalidInput { .. }));

    assert_eq!(bufs.isp().pos(), 0);
    assert_eq!(bufs.tsp().pos(), 0);
}

#[test]
fn zero_points_touch_nothing() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    bufs.tsp_mut().set_pos(1);

    let report = draw(&mut p, &flat_context(), &DrawInput::direct(&[]), &mut bufs).unwrap();

    assert_eq!(report, DrawReport::default());
    assert_eq!(bufs.tsp().pos(), 1);
}

#[test]
fn bogus_depth_counts_up_across_calls() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let ctx = PointContext { disable_z_buffer: true, ..flat_context() };
    let verts = row(3);
    let step = PipelineConfig::default().depth_step;

    draw(&mut p, &ctx, &DrawInput::direct(&verts), &mut bufs).unwrap();

    let mut expected = 0.0f32;
    for i in 0..3 {
        assert_eq!(native_depth(&bufs, i), expected);
        expected += step;
    }
    assert_eq!(p.bogus_inv_z(), expected);

    draw(&mut p, &ctx, &DrawInput::direct(&verts[..1]), &mut bufs).unwrap();
    assert_eq!(native_depth(&bufs, 3), expected);

    let explicit = PointContext { bogus_inv_z: Some(0.5), ..ctx };
    draw(&mut p, &explicit, &DrawInput::direct(&verts[..1]), &mut bufs).unwrap();
    assert_eq!(native_depth(&bufs, 4), 0.5);
    assert_eq!(p.bogus_inv_z(), 0.5 + step);
}

#[test]
fn z_compare_direction() {
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let verts = [
        Vertex { z: 0.25, ..vertex(8.0, 8.0, 0) },
        Vertex { z: 1.5, ..vertex(8.0, 8.0, 0) },
    ];

    let mut p = pipeline::<NativeFloat>();
    draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();
    assert_eq!(native_depth(&bufs, 0), 0.75);
    // Z beyond 1 clamps to the far plane.
    assert_eq!(native_depth(&bufs, 1), 0.0);

    let ctx = PointContext { z_compare: ZCompare::GreaterEqual, ..flat_context() };
    draw(&mut p, &ctx, &DrawInput::direct(&verts[..1]), &mut bufs).unwrap();
    assert_eq!(native_depth(&bufs, 2), 0.25);
}

#[test]
fn depth_scale_and_reciprocal_w() {
    let config = PipelineConfig { depth_scale: 2.0, ..PipelineConfig::default() };
    let mut p = PointPipeline::<NativeFloat>::new(config.clone()).unwrap();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let verts = [Vertex { z: 0.25, inv_w: 0.125, ..vertex(8.0, 8.0, 0) }];

    draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();
    assert_eq!(native_depth(&bufs, 0), 1.5);

    let mut p = PointPipeline::<NativeFloat>::new(PipelineConfig { depth_source: DepthSource::ReciprocalW, ..config })
        .unwrap();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();
    assert_eq!(native_depth(&bufs, 0), 0.25);
}

#[test]
fn depth_bias_uses_low_five_bits_on_native_profile() {
    let step = PipelineConfig::default().depth_step;
    let ctx = PointContext { depth_bias: Some(0x23), ..flat_context() };
    let verts = row(1);

    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    draw(&mut p, &ctx, &DrawInput::direct(&verts), &mut bufs).unwrap();
    assert_eq!(native_depth(&bufs, 0), 0.5 + step * 3.0);

    let mut p = pipeline::<PackedFixed>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    draw(&mut p, &ctx, &DrawInput::direct(&verts), &mut bufs).unwrap();
    assert_eq!(bufs.isp().words()[2], 0x4000_0000);
}

#[test]
fn fog_flag() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let verts = row(1);

    let unfogged = PointContext { fog: false, ..flat_context() };
    draw(&mut p, &unfogged, &DrawInput::direct(&verts), &mut bufs).unwrap();
    assert_eq!(bufs.tsp().words()[0] & MASK_DISABLE_FOG, MASK_DISABLE_FOG);
    assert!(!p.fog_used());

    draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();
    assert_eq!(bufs.tsp().words()[4] & MASK_DISABLE_FOG, 0);
    assert!(p.fog_used());
}

#[test]
fn untextured_records_are_aligned() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    bufs.tsp_mut().set_pos(3);
    let verts = row(1);

    draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(bufs.tsp().pos(), 6);
    assert_eq!(bufs.tsp().words()[4..6], [0x01, 0x0101_0000]);
    assert_eq!(bufs.isp().words()[3], PCX2_FORW_VISIB_FP | (2 << 4));
}

#[test]
fn textured_record_fields() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let ctx = PointContext {
        texture: true,
        line_width: 1,
        texture_name: 0x1234_5678,
        mipmap_offset: Some(0),
        ..flat_context()
    };
    let verts = [Vertex { x: 10.0, y: 20.0, inv_w: 1.0, u_over_w: 0.5, v_over_w: 0.25, ..Vertex::default() }];

    draw(&mut p, &ctx, &DrawInput::direct(&verts), &mut bufs).unwrap();

    let tsp = bufs.tsp().words();
    assert_eq!(tsp.len(), 8);
    assert_eq!(tsp[0], MASK_TEXTURE | (9 << SHIFT_EXPONENT));
    assert_eq!(tsp[2], (255 << SHIFT_PMIP_M) | (48 << SHIFT_PMIP_E) | 16399);
    assert_eq!(tsp[3], 0);
    assert_eq!(tsp[4], 0x5678_0000 | 3779);
    assert_eq!(tsp[5], 32767);
    assert_eq!(tsp[6], 0x1234_0000 | 1409);
    assert_eq!(tsp[7], 32767 << 16);
}

#[test]
fn shadow_records_blend_color() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(1000, 1000);
    let ctx = PointContext { lighting: Lighting::Shadow { brightness: 0.5 }, ..flat_context() };
    let verts = [vertex(8.0, 8.0, 0x00FF_8040)];

    draw(&mut p, &ctx, &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(bufs.tsp().words(), &[MASK_SHADOW_FLAG | 0x7F, 0x4020_0000 | 3 | (7 << 5) | (15 << 10)]);
}

#[test]
fn many_points_span_several_bursts() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(2000, 1000);
    let verts = row(100);

    let report = draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(report.emitted, 100);
    assert_eq!(report.consumed, 100);
    assert!(!report.exhausted);
    assert_eq!(bufs.isp().pos(), 2000);
    assert_eq!(bufs.tsp().pos(), 200);
    assert_eq!(bufs.tsp().words()[198], 0x64);
    assert_eq!(bufs.isp().words()[99 * 20 + 3], PCX2_FORW_VISIB_FP | (99 << 4));
}

#[test]
fn segmented_isp_buffer() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(200, 1000).with_segment_words(50);
    let verts = row(5);

    let report = draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(report.emitted, 5);
    let addrs: Vec<usize> = bufs.region_objects().iter().map(|o| o.address).collect();
    assert_eq!(addrs, [0, 20, 50, 70, 100]);
    // Points keep their own TSP address across chunks.
    assert_eq!(bufs.isp().words()[100 + 3], PCX2_FORW_VISIB_FP | (4 << 4));
}

#[test]
fn fragmented_isp_buffer_stops_early() {
    let mut p = pipeline::<NativeFloat>();
    let mut bufs = SoftParamBuffers::new(110, 1000).with_segment_words(50);
    let verts = row(5);

    let report = draw(&mut p, &flat_context(), &DrawInput::direct(&verts), &mut bufs).unwrap();

    assert_eq!(report.admitted, 5);
    assert_eq!(report.emitted, 4);
    assert_eq!(report.consumed, 4);
    assert!(report.exhausted);
    assert_eq!(bufs.isp().pos(), 90);
    assert_eq!(bufs.tsp().pos(), 8);
}
