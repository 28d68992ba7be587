//! AWS provider implementation

use crate::convert;
use crate::error::{from_sdk, from_unsuccessful};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ec2::types::{IpPermission, UserIdGroupPair};
use vpcreaper_cloud::resource::{
    Address, ClassicLoadBalancer, FileSystem, Instance, InternetGateway, LoadBalancer,
    MountTarget, NatGateway, NetworkInterface, RevokeIngress, RouteTable, SecurityGroup, Subnet,
    VpcEndpoint,
};
use vpcreaper_cloud::{NetworkProvider, ProviderResult};

/// AWS provider
///
/// One client per service, all sharing the same resolved SDK config.
pub struct AwsProvider {
    ec2: aws_sdk_ec2::Client,
    efs: aws_sdk_efs::Client,
    elb: aws_sdk_elasticloadbalancing::Client,
    elbv2: aws_sdk_elasticloadbalancingv2::Client,
}

impl AwsProvider {
    /// Build clients from an already loaded SDK config
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            ec2: aws_sdk_ec2::Client::new(config),
            efs: aws_sdk_efs::Client::new(config),
            elb: aws_sdk_elasticloadbalancing::Client::new(config),
            elbv2: aws_sdk_elasticloadbalancingv2::Client::new(config),
        }
    }

    /// Resolve credentials and region from the environment. An explicit
    /// `region` overrides whatever the environment says.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;
        tracing::debug!(region = ?config.region(), "Loaded AWS config");
        Self::new(&config)
    }
}

#[async_trait]
impl NetworkProvider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn describe_instances(&self, vpc_id: &str) -> ProviderResult<Vec<Instance>> {
        let mut instances = Vec::new();
        let mut pages = self
            .ec2
            .describe_instances()
            .filters(convert::vpc_filter(vpc_id))
            .into_paginator()
            .send();
        while let Some(page) = pages.try_next().await.map_err(from_sdk)? {
            for reservation in page.reservations() {
                instances.extend(reservation.instances().iter().filter_map(convert::instance));
            }
        }
        Ok(instances)
    }

    async fn terminate_instances(&self, instance_ids: &[String]) -> ProviderResult<()> {
        self.ec2
            .terminate_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_load_balancers(&self) -> ProviderResult<Vec<LoadBalancer>> {
        let mut balancers = Vec::new();
        let mut marker = None;
        loop {
            let page = self
                .elbv2
                .describe_load_balancers()
                .set_marker(marker)
                .send()
                .await
                .map_err(from_sdk)?;
            balancers.extend(page.load_balancers().iter().filter_map(convert::load_balancer));
            marker = page.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }
        Ok(balancers)
    }

    async fn delete_load_balancer(&self, arn: &str) -> ProviderResult<()> {
        self.elbv2
            .delete_load_balancer()
            .load_balancer_arn(arn)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_classic_load_balancers(&self) -> ProviderResult<Vec<ClassicLoadBalancer>> {
        let mut balancers = Vec::new();
        let mut marker = None;
        loop {
            let page = self
                .elb
                .describe_load_balancers()
                .set_marker(marker)
                .send()
                .await
                .map_err(from_sdk)?;
            balancers.extend(
                page.load_balancer_descriptions()
                    .iter()
                    .filter_map(convert::classic_load_balancer),
            );
            marker = page.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }
        Ok(balancers)
    }

    async fn delete_classic_load_balancer(&self, name: &str) -> ProviderResult<()> {
        self.elb
            .delete_load_balancer()
            .load_balancer_name(name)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_file_systems(&self) -> ProviderResult<Vec<FileSystem>> {
        let mut file_systems = Vec::new();
        let mut marker = None;
        loop {
            let page = self
                .efs
                .describe_file_systems()
                .set_marker(marker)
                .send()
                .await
                .map_err(from_sdk)?;
            file_systems.extend(page.file_systems().iter().map(convert::file_system));
            marker = page.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }
        Ok(file_systems)
    }

    async fn describe_mount_targets(
        &self,
        file_system_id: &str,
    ) -> ProviderResult<Vec<MountTarget>> {
        let mut mount_targets = Vec::new();
        let mut marker = None;
        loop {
            let page = self
                .efs
                .describe_mount_targets()
                .file_system_id(file_system_id)
                .set_marker(marker)
                .send()
                .await
                .map_err(from_sdk)?;
            mount_targets.extend(page.mount_targets().iter().map(convert::mount_target));
            marker = page.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }
        Ok(mount_targets)
    }

    async fn delete_mount_target(&self, mount_target_id: &str) -> ProviderResult<()> {
        self.efs
            .delete_mount_target()
            .mount_target_id(mount_target_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn delete_file_system(&self, file_system_id: &str) -> ProviderResult<()> {
        self.efs
            .delete_file_system()
            .file_system_id(file_system_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_nat_gateways(&self, vpc_id: &str) -> ProviderResult<Vec<NatGateway>> {
        let mut gateways = Vec::new();
        let mut pages = self
            .ec2
            .describe_nat_gateways()
            .filter(convert::vpc_filter(vpc_id))
            .into_paginator()
            .send();
        while let Some(page) = pages.try_next().await.map_err(from_sdk)? {
            gateways.extend(page.nat_gateways().iter().filter_map(convert::nat_gateway));
        }
        Ok(gateways)
    }

    async fn delete_nat_gateway(&self, nat_gateway_id: &str) -> ProviderResult<()> {
        self.ec2
            .delete_nat_gateway()
            .nat_gateway_id(nat_gateway_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_network_interfaces(
        &self,
        vpc_id: &str,
    ) -> ProviderResult<Vec<NetworkInterface>> {
        let mut interfaces = Vec::new();
        let mut pages = self
            .ec2
            .describe_network_interfaces()
            .filters(convert::vpc_filter(vpc_id))
            .into_paginator()
            .send();
        while let Some(page) = pages.try_next().await.map_err(from_sdk)? {
            interfaces.extend(
                page.network_interfaces()
                    .iter()
                    .filter_map(convert::network_interface),
            );
        }
        Ok(interfaces)
    }

    async fn detach_network_interface(&self, attachment_id: &str) -> ProviderResult<()> {
        self.ec2
            .detach_network_interface()
            .attachment_id(attachment_id)
            .force(true)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn delete_network_interface(&self, network_interface_id: &str) -> ProviderResult<()> {
        self.ec2
            .delete_network_interface()
            .network_interface_id(network_interface_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_security_groups(&self, vpc_id: &str) -> ProviderResult<Vec<SecurityGroup>> {
        let mut groups = Vec::new();
        let mut pages = self
            .ec2
            .describe_security_groups()
            .filters(convert::vpc_filter(vpc_id))
            .into_paginator()
            .send();
        while let Some(page) = pages.try_next().await.map_err(from_sdk)? {
            groups.extend(page.security_groups().iter().filter_map(convert::security_group));
        }
        Ok(groups)
    }

    async fn revoke_security_group_ingress(&self, request: &RevokeIngress) -> ProviderResult<()> {
        let mut call = self
            .ec2
            .revoke_security_group_ingress()
            .group_id(&request.group_id);

        if let Some(cidr) = &request.cidr {
            call = call
                .ip_protocol(&cidr.protocol)
                .set_from_port(cidr.from_port)
                .set_to_port(cidr.to_port)
                .cidr_ip(&cidr.cidr);
        }
        for permission in &request.permissions {
            let pairs = permission
                .group_pairs
                .iter()
                .map(|pair| {
                    UserIdGroupPair::builder()
                        .group_id(&pair.group_id)
                        .set_user_id(pair.user_id.clone())
                        .build()
                })
                .collect();
            call = call.ip_permissions(
                IpPermission::builder()
                    .ip_protocol(&permission.protocol)
                    .set_from_port(permission.from_port)
                    .set_to_port(permission.to_port)
                    .set_user_id_group_pairs(Some(pairs))
                    .build(),
            );
        }

        call.send().await.map_err(from_sdk)?;
        Ok(())
    }

    async fn delete_security_group(&self, group_id: &str) -> ProviderResult<()> {
        self.ec2
            .delete_security_group()
            .group_id(group_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_internet_gateways(
        &self,
        vpc_id: &str,
    ) -> ProviderResult<Vec<InternetGateway>> {
        let mut gateways = Vec::new();
        let mut pages = self
            .ec2
            .describe_internet_gateways()
            .filters(convert::filter("attachment.vpc-id", vpc_id))
            .into_paginator()
            .send();
        while let Some(page) = pages.try_next().await.map_err(from_sdk)? {
            gateways.extend(
                page.internet_gateways()
                    .iter()
                    .filter_map(convert::internet_gateway),
            );
        }
        Ok(gateways)
    }

    async fn detach_internet_gateway(
        &self,
        gateway_id: &str,
        vpc_id: &str,
    ) -> ProviderResult<()> {
        self.ec2
            .detach_internet_gateway()
            .internet_gateway_id(gateway_id)
            .vpc_id(vpc_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> ProviderResult<()> {
        self.ec2
            .delete_internet_gateway()
            .internet_gateway_id(gateway_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_subnets(&self, vpc_id: &str) -> ProviderResult<Vec<Subnet>> {
        let mut subnets = Vec::new();
        let mut pages = self
            .ec2
            .describe_subnets()
            .filters(convert::vpc_filter(vpc_id))
            .into_paginator()
            .send();
        while let Some(page) = pages.try_next().await.map_err(from_sdk)? {
            subnets.extend(page.subnets().iter().filter_map(convert::subnet));
        }
        Ok(subnets)
    }

    async fn delete_subnet(&self, subnet_id: &str) -> ProviderResult<()> {
        self.ec2
            .delete_subnet()
            .subnet_id(subnet_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_route_tables(&self, vpc_id: &str) -> ProviderResult<Vec<RouteTable>> {
        let mut tables = Vec::new();
        let mut pages = self
            .ec2
            .describe_route_tables()
            .filters(convert::vpc_filter(vpc_id))
            .into_paginator()
            .send();
        while let Some(page) = pages.try_next().await.map_err(from_sdk)? {
            tables.extend(page.route_tables().iter().filter_map(convert::route_table));
        }
        Ok(tables)
    }

    async fn delete_route_table(&self, route_table_id: &str) -> ProviderResult<()> {
        self.ec2
            .delete_route_table()
            .route_table_id(route_table_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_vpc_endpoints(&self, vpc_id: &str) -> ProviderResult<Vec<VpcEndpoint>> {
        let mut endpoints = Vec::new();
        let mut pages = self
            .ec2
            .describe_vpc_endpoints()
            .filters(convert::vpc_filter(vpc_id))
            .into_paginator()
            .send();
        while let Some(page) = pages.try_next().await.map_err(from_sdk)? {
            endpoints.extend(page.vpc_endpoints().iter().filter_map(convert::vpc_endpoint));
        }
        Ok(endpoints)
    }

    async fn delete_vpc_endpoints(&self, endpoint_ids: &[String]) -> ProviderResult<()> {
        let output = self
            .ec2
            .delete_vpc_endpoints()
            .set_vpc_endpoint_ids(Some(endpoint_ids.to_vec()))
            .send()
            .await
            .map_err(from_sdk)?;
        match from_unsuccessful(output.unsuccessful()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn delete_vpc(&self, vpc_id: &str) -> ProviderResult<()> {
        self.ec2
            .delete_vpc()
            .vpc_id(vpc_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn describe_addresses(&self) -> ProviderResult<Vec<Address>> {
        let output = self
            .ec2
            .describe_addresses()
            .filters(convert::filter("domain", "vpc"))
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(output.addresses().iter().filter_map(convert::address).collect())
    }

    async fn disassociate_address(&self, association_id: &str) -> ProviderResult<()> {
        self.ec2
            .disassociate_address()
            .association_id(association_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }

    async fn release_address(&self, allocation_id: &str) -> ProviderResult<()> {
        self.ec2
            .release_address()
            .allocation_id(allocation_id)
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(())
    }
}
