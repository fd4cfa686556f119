fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only rerun if proto files change
    println!("cargo:rerun-if-changed=proto/ecommerce");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(
            &[
                "proto/ecommerce/product_service.proto",
                "proto/ecommerce/review_service.proto",
                "proto/ecommerce/order_service.proto",
                "proto/ecommerce/image_service.proto",
                "proto/ecommerce/auth_service.proto",
            ],
            &["proto"],
        )?;
    Ok(())
}
