mod kube;

pub use self::kube::{build_client, default_kubeconfig_path, load_config, resolve_source, KubeconfigSource};
