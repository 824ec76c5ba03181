use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let protoc_path =
        protoc_bin_vendored::protoc_bin_path().expect("failed to get vendored protoc binary");
    unsafe {
        std::env::set_var("PROTOC", &protoc_path);
    }

    // Server bindings are only exercised by in-process test daemons.
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(
            &[
                "proto/runtime/v1/api.proto",
                "proto/containerd/types/mount.proto",
                "proto/containerd/types/descriptor.proto",
                "proto/containerd/v1/types/task.proto",
                "proto/containerd/services/containers/v1/containers.proto",
                "proto/containerd/services/tasks/v1/tasks.proto",
                "proto/containerd/services/snapshots/v1/snapshots.proto",
                "proto/containerd/services/images/v1/images.proto",
                "proto/containerd/services/content/v1/content.proto",
            ],
            &["proto"],
        )?;

    Ok(())
}
