//! Integration tests for instance streaming and the draw loop.
//!
//! Tests are parameterized using `rstest` to run against every backend.
//! Backends that cannot be created (no GPU adapter) are skipped.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p voxtile-graphics --test streaming_tests
//! ```

mod common;

use std::sync::Arc;

use rstest::rstest;

use common::{Backend, TestContext, read_transforms, transform};
use voxtile_core::mesh::generators::generate_block_corners;
use voxtile_core::mesh::{FaceCorner, MeshBuildError, build_mesh};
use voxtile_core::scene::{InstanceTransform, MeshCategory};
use voxtile_core::texture::CpuTexture;
use voxtile_graphics::{
    BufferUsage, GraphicsError, GrowableBuffer, MeshAsset, MeshLoadError, RecordingEncoder,
    RenderContext,
};

// ============================================================================
// Growable Buffer Tests
// ============================================================================

/// Appends across several growth steps, uploads, and checks device contents.
#[rstest]
#[case::dummy(Backend::Dummy)]
#[case::webgpu(Backend::WebGpu)]
fn test_growable_upload_preserves_order(#[case] backend: Backend) {
    let Some(ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let mut stream =
        GrowableBuffer::<InstanceTransform>::new(&ctx.device, BufferUsage::VERTEX, "stream");
    for i in 0..85 {
        stream.append(transform(i)).unwrap();
    }
    assert_eq!(stream.capacity(), 160);

    let mut pass = ctx.device.begin_copy_pass();
    stream.upload(&mut pass).unwrap();
    pass.submit().unwrap();

    let uploaded = read_transforms(stream.device_buffer().unwrap(), 85);
    assert_eq!(uploaded, (0..85).map(transform).collect::<Vec<_>>());
}

/// Reuses the staging and device buffers over several frames.
#[rstest]
#[case::dummy(Backend::Dummy)]
#[case::webgpu(Backend::WebGpu)]
fn test_growable_multiple_frames(#[case] backend: Backend) {
    let Some(ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let mut stream =
        GrowableBuffer::<InstanceTransform>::new(&ctx.device, BufferUsage::VERTEX, "stream");
    let mut first_buffer = None;

    for (frame, count) in [30u32, 12, 40, 7].into_iter().enumerate() {
        let offset = frame as u32 * 100;
        for i in 0..count {
            stream.append(transform(offset + i)).unwrap();
        }
        let mut pass = ctx.device.begin_copy_pass();
        stream.upload(&mut pass).unwrap();
        pass.submit().unwrap();

        assert_eq!(stream.size(), count);
        assert_eq!(stream.capacity(), 40);
        let buffer = Arc::clone(stream.device_buffer().unwrap());
        let first = first_buffer.get_or_insert_with(|| Arc::clone(&buffer));
        assert!(Arc::ptr_eq(first, &buffer), "device buffer recreated in frame {frame}");

        let expected: Vec<_> = (0..count).map(|i| transform(offset + i)).collect();
        assert_eq!(read_transforms(&buffer, count), expected);
    }
}

/// Device allocation failure leaves the category undrawn but keeps the process going.
#[test]
fn test_device_allocation_failure_skips_draw() {
    let params = Backend::Dummy
        .to_instance_parameters()
        .with_device_memory_budget(4096);
    let Some(ctx) = TestContext::with_parameters(Backend::Dummy, params) else {
        return;
    };

    let mut context = RenderContext::new(&ctx.device);
    context.register_mesh(MeshCategory::Grass00, ctx.create_block_mesh("grass"));

    // 20 instances fit in 320 bytes; 400 need 6400 bytes.
    for i in 0..400 {
        context.push_instance(MeshCategory::Grass00, transform(i));
    }
    let mut pass = ctx.device.begin_copy_pass();
    assert_eq!(context.upload_instances(&mut pass), 1);
    pass.submit().unwrap();

    let mut encoder = RecordingEncoder::new();
    assert_eq!(context.draw(&mut encoder), 0);
    assert!(encoder.draws().is_empty());
}

// ============================================================================
// Frame Draw Loop Tests
// ============================================================================

/// Full frame: meshes built once, instances pushed, uploaded and drawn.
#[rstest]
#[case::dummy(Backend::Dummy)]
#[case::webgpu(Backend::WebGpu)]
fn test_frame_draws_each_populated_category(#[case] backend: Backend) {
    let Some(ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let mut context = RenderContext::new(&ctx.device);
    for category in MeshCategory::ALL {
        context.register_mesh(category, ctx.create_block_mesh(category.asset_name()));
    }

    let counts = [
        (MeshCategory::Player00, 1),
        (MeshCategory::Grass00, 25),
        (MeshCategory::Water00, 3),
    ];
    for (category, count) in counts {
        for i in 0..count {
            assert!(context.push_instance(category, transform(i)));
        }
    }

    let mut pass = ctx.device.begin_copy_pass();
    assert_eq!(context.upload_instances(&mut pass), 0);
    assert_eq!(pass.operation_count(), 3);
    pass.submit().unwrap();

    let mut encoder = RecordingEncoder::new();
    assert_eq!(context.draw(&mut encoder), 3);
    assert_eq!(encoder.draws(), vec![(36, 1), (36, 25), (36, 3)]);

    let grass = context.instances(MeshCategory::Grass00).unwrap();
    assert_eq!(
        read_transforms(grass.device_buffer().unwrap(), 25),
        (0..25).map(transform).collect::<Vec<_>>()
    );
}

// ============================================================================
// Mesh Build Tests
// ============================================================================

/// Static mesh buffers read back with the data that was uploaded.
#[rstest]
#[case::dummy(Backend::Dummy)]
#[case::webgpu(Backend::WebGpu)]
fn test_mesh_buffers_read_back(#[case] backend: Backend) {
    let Some(ctx) = TestContext::new(backend) else {
        eprintln!("Backend {:?} not available, skipping", backend);
        return;
    };

    let corners = generate_block_corners(0.8, 0.5);
    let expected = build_mesh(&corners).unwrap();
    let mesh = ctx.create_block_mesh("block");

    let vertex_bytes = mesh
        .vertex_buffer()
        .read_back(0, mesh.vertex_buffer().size())
        .unwrap();
    assert_eq!(vertex_bytes, bytemuck::cast_slice::<_, u8>(&expected.vertices));

    // Odd offset and length inside the index buffer.
    let index_bytes = mesh.index_buffer().read_back(2, 6).unwrap();
    let all_indices: &[u8] = bytemuck::cast_slice(&expected.indices);
    assert_eq!(index_bytes, all_indices[2..8].to_vec());
}

/// A mesh with too many unique vertices fails before any GPU resource exists.
#[test]
fn test_oversized_mesh_creates_no_buffers() {
    let Some(ctx) = TestContext::new(Backend::Dummy) else {
        return;
    };

    // 70,000 distinct texcoords at the same position and normal.
    let corners: Vec<FaceCorner> = (0..70_000)
        .map(|i| FaceCorner::new([0.0; 3], [i as f32, 0.0], [0.0, 1.0, 0.0]))
        .collect();
    assert!(matches!(
        build_mesh(&corners),
        Err(MeshBuildError::TooManyVertices { count: 70_000 })
    ));

    let palette = CpuTexture::from_colors(&[[0, 0, 0, 255]]).unwrap();
    let result = MeshAsset::build(&ctx.device, &corners, &palette, "huge");
    assert!(matches!(
        result,
        Err(MeshLoadError::Build(MeshBuildError::TooManyVertices { .. }))
    ));
    assert_eq!(ctx.device.buffer_count(), 0);
}

/// Staging allocations above the device limit are rejected.
#[test]
fn test_staging_over_limit_is_invalid() {
    let Some(ctx) = TestContext::new(Backend::Dummy) else {
        return;
    };
    let limit = ctx.device.capabilities().max_buffer_size;
    assert!(matches!(
        ctx.device.create_staging_buffer(limit + 1, None),
        Err(GraphicsError::InvalidParameter(_))
    ));
}
